//! Warehouse lead-time table.

use std::path::Path;

use crate::error::Result;

/// One warehouse's shipping lead time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadTimeEntry {
    pub warehouse_code: String,
    pub lead_days: i64,
}

/// In-memory lead-time table, loaded once at startup and read-only after.
#[derive(Debug, Clone, Default)]
pub struct LeadTimeTable {
    entries: Vec<LeadTimeEntry>,
}

impl LeadTimeTable {
    /// Build a table directly from entries.
    pub fn from_entries(entries: Vec<LeadTimeEntry>) -> Self {
        Self { entries }
    }

    /// Load the table from a CSV file.
    ///
    /// The header row is skipped; column 0 holds the warehouse code and
    /// column 2 the lead time in days. Rows missing either, or carrying a
    /// non-integer lead value, are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path.as_ref())?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(code) = record.get(0) else { continue };
            if code.is_empty() {
                continue;
            }
            let Some(raw_days) = record.get(2) else {
                log::debug!("Skipping lead-time row for {code}: no lead-days column");
                continue;
            };
            match raw_days.trim().parse::<i64>() {
                Ok(lead_days) => entries.push(LeadTimeEntry {
                    warehouse_code: code.to_string(),
                    lead_days,
                }),
                Err(_) => {
                    log::debug!(
                        "Skipping lead-time row for {code}: '{raw_days}' is not a number"
                    );
                }
            }
        }

        Ok(Self { entries })
    }

    /// Look up the lead time for a raw warehouse label.
    ///
    /// The key is the label's first comma-delimited token, compared exactly
    /// as it appears; the first matching entry wins.
    pub fn lookup(&self, warehouse_label: &str) -> Option<i64> {
        let code = warehouse_label.split(',').next().unwrap_or("");
        self.entries
            .iter()
            .find(|entry| entry.warehouse_code == code)
            .map(|entry| entry.lead_days)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
