//! Persisted history of completed conversions.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// One logged conversion. `amount` keeps the exact string the user typed;
/// `converted_amount` is the rounded result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub date: NaiveDate,
    pub amount: String,
    pub base_currency: String,
    pub target_currency: String,
    pub converted_amount: Decimal,
}

/// Append-only conversion history in a single JSON file.
///
/// Every append rewrites the whole file. Fine for a per-user log, but the
/// file must not be shared between processes.
pub struct ConversionLog {
    path: PathBuf,
}

impl ConversionLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Every record logged so far, oldest first. A missing file is an
    /// empty history.
    pub fn read_all(&self) -> Result<Vec<ConversionRecord>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()));
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid conversion history", self.path.display()))
    }

    pub fn append(&self, record: &ConversionRecord) -> Result<()> {
        let mut records = self.read_all()?;
        records.push(record.clone());
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(total = records.len(), "appended conversion record");
        Ok(())
    }
}
