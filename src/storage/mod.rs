//! Report persistence.
//!
//! The run accumulates [`TrackingRow`]s in memory and writes them out
//! once at the end through a [`ReportStorage`] backend. The default
//! backend is a local CSV file.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::TrackingRow;

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a report write.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    /// Data rows written, header excluded
    pub rows_written: usize,
    /// Where the report landed
    pub location: String,
    /// Timestamp of the write
    pub written_at: DateTime<Utc>,
}

/// Trait for report storage backends.
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Persist the full report in one shot.
    async fn save_report(&self, rows: &[TrackingRow]) -> Result<ReportSummary>;
}
