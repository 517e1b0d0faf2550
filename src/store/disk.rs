//! Dated on-disk cache of raw API responses.
//!
//! Layout, relative to the cache root:
//!
//! ```text
//! currency/<date>/currencies_<date>.json
//! conversions/<date>/source_<CODE>.json
//! ```

use crate::core::rates::{CurrencyListResponse, RateTableResponse};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CURRENCY_DIR: &str = "currency";
const CONVERSIONS_DIR: &str = "conversions";

pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Creates the cache root and both sub-roots. Safe to call repeatedly.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [CURRENCY_DIR, CONVERSIONS_DIR] {
            let path = self.root.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("failed to create cache directory {}", path.display()))?;
        }
        Ok(())
    }

    fn currency_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(CURRENCY_DIR)
            .join(date.to_string())
            .join(format!("currencies_{date}.json"))
    }

    fn rate_table_path(&self, source: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join(CONVERSIONS_DIR)
            .join(date.to_string())
            .join(format!("source_{source}.json"))
    }

    pub fn read_currencies(&self, date: NaiveDate) -> Option<CurrencyListResponse> {
        read_json(&self.currency_path(date))
    }

    pub fn write_currencies(&self, date: NaiveDate, document: &CurrencyListResponse) -> Result<()> {
        write_json(&self.currency_path(date), document)
    }

    pub fn read_rate_table(&self, source: &str, date: NaiveDate) -> Option<RateTableResponse> {
        read_json(&self.rate_table_path(source, date))
    }

    pub fn write_rate_table(
        &self,
        source: &str,
        date: NaiveDate,
        document: &RateTableResponse,
    ) -> Result<()> {
        write_json(&self.rate_table_path(source, date), document)
    }
}

/// A missing entry is a miss. An unreadable or corrupt entry is warned
/// about and also reported as a miss, so it gets re-fetched and
/// overwritten; this covers torn writes, since writes are not atomic.
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.is_file() {
        debug!("cache miss: {}", path.display());
        return None;
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "could not read cache entry {}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => {
            debug!("cache hit: {}", path.display());
            Some(value)
        }
        Err(e) => {
            warn!(error = %e, "ignoring corrupt cache entry {}", path.display());
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create cache directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("cached {}", path.display());
    Ok(())
}
