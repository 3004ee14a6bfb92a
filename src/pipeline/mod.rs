//! Pipeline entry points for bot operations.
//!
//! - `run_submission`: Crawl the queue and push every shipment through the wizard
//! - `run_scan`: Crawl the queue only and list the matching shipments

pub mod run;

pub use run::{run_scan, run_submission, RunInputs, RunSummary};
