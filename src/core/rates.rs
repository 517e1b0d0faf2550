//! Pricing provider abstractions and wire types

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// ISO 4217 code to display name, as served by the currency-list endpoint.
pub type CurrencyCatalog = BTreeMap<String, String>;

/// Full body of a currency-list response. Fields other than `currencies`
/// ride along in `rest` so a cached copy keeps the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyListResponse {
    pub currencies: CurrencyCatalog,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Full body of a historical-rates response for one (source, date) pair.
/// Each rate is a multiplier: `target_amount = source_amount * rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTableResponse {
    pub results: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode server response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// The currency catalog as of today.
    async fn fetch_currencies(&self) -> Result<CurrencyListResponse, RateError>;

    /// Rates from `source` to every available currency on a past `date`.
    async fn fetch_rate_table(
        &self,
        source: &str,
        date: NaiveDate,
    ) -> Result<RateTableResponse, RateError>;
}
