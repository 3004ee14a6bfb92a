// src/pipeline/run.rs

//! End-to-end submission run.
//!
//! Threads the crawler, wizard, and report storage together: collect
//! shipment identifiers from the queue, drive each one through the
//! wizard, then persist every extracted row in a single write.

use chrono::{DateTime, Utc};

use crate::automation::PageAutomator;
use crate::error::Result;
use crate::models::{Config, LeadTimeTable, ShipmentId};
use crate::schedule;
use crate::services::{QueueCrawler, SubmissionWizard};
use crate::storage::ReportStorage;

/// User-supplied inputs for one run.
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// Pickup phrase matched against queue labels, e.g.
    /// `Pickup: Thu, Sep 19, 2024 CDT`
    pub pickup_marker: String,
    /// Ship date as MM/DD/YYYY
    pub ship_date: String,
}

/// Counters for a finished run.
#[derive(Debug)]
pub struct RunSummary {
    pub shipments: usize,
    pub rows_written: usize,
    /// Shipments whose warehouse had no lead-time entry
    pub without_lead_time: usize,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

/// Crawl the queue, drive every matching shipment through the wizard,
/// and persist the collected report.
pub async fn run_submission(
    config: &Config,
    inputs: &RunInputs,
    page: &dyn PageAutomator,
    lead_times: &LeadTimeTable,
    storage: &dyn ReportStorage,
) -> Result<RunSummary> {
    let started = Utc::now();
    schedule::parse_ship_date(&inputs.ship_date)?;

    let crawler = QueueCrawler::new(config, page);
    let shipments = crawler.collect(&inputs.pickup_marker).await?;
    log::info!("Processing {} shipments", shipments.len());

    let wizard = SubmissionWizard::new(config, page, lead_times);
    let mut rows = Vec::new();
    let mut without_lead_time = 0;
    for shipment in &shipments {
        log::info!("Processing {shipment}");
        let outcome = wizard.process(shipment, &inputs.ship_date).await?;
        if outcome.schedule.is_none() {
            without_lead_time += 1;
        }
        rows.extend(outcome.rows);
    }

    let report = storage.save_report(&rows).await?;

    Ok(RunSummary {
        shipments: shipments.len(),
        rows_written: report.rows_written,
        without_lead_time,
        started,
        finished: Utc::now(),
    })
}

/// Crawl the queue only, listing the shipments a run would process.
pub async fn run_scan(
    config: &Config,
    pickup_marker: &str,
    page: &dyn PageAutomator,
) -> Result<Vec<ShipmentId>> {
    let crawler = QueueCrawler::new(config, page);
    crawler.collect(pickup_marker).await
}
