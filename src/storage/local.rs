//! Local filesystem report storage.
//!
//! Writes the tracking report as a CSV file with a fixed header row,
//! atomically (write to temp, then rename) so an interrupted run never
//! leaves a half-written report behind.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::TrackingRow;
use crate::storage::{ReportStorage, ReportSummary};

/// Header row of the tracking report.
const REPORT_HEADER: [&str; 5] = ["ARN", "ASN", "Amazon Label", "UPS Tracking", "Warehouse Name"];

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    output_path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage writing to the given file path.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    fn encode(rows: &[TrackingRow]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(REPORT_HEADER)?;
        for row in rows {
            writer.write_record([
                &row.arn,
                &row.asn,
                &row.label,
                &row.tracking,
                &row.warehouse,
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.output_path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.output_path).await?;
        Ok(())
    }
}

#[async_trait]
impl ReportStorage for LocalStorage {
    async fn save_report(&self, rows: &[TrackingRow]) -> Result<ReportSummary> {
        let bytes = Self::encode(rows)?;
        self.write_bytes(&bytes).await?;

        let location = self.output_path.display().to_string();
        log::info!("Data saved to {location}");
        Ok(ReportSummary {
            rows_written: rows.len(),
            location,
            written_at: Utc::now(),
        })
    }
}
