//! Service layer for the ASN bot.
//!
//! This module contains the portal-facing business logic:
//! - Shipping queue crawling (`QueueCrawler`)
//! - Submission wizard driving (`SubmissionWizard`)

mod queue;
mod wizard;

pub use queue::QueueCrawler;
pub use wizard::{SubmissionWizard, WizardOutcome};
