//! Turns a validated request into a logged conversion.

use crate::core::rates::{RateError, RateProvider};
use crate::history::{ConversionLog, ConversionRecord};
use crate::input::ConversionRequest;
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Rates(#[from] RateError),
    #[error("no {target} rate published for {currency_source} on {date}")]
    RateNotFound {
        currency_source: String,
        target: String,
        date: NaiveDate,
    },
    #[error("{rate} is not a usable conversion rate")]
    BadRate { rate: f64 },
    #[error("{amount:?} is not a valid amount")]
    BadAmount { amount: String },
    #[error("failed to record the conversion: {0}")]
    Log(#[source] anyhow::Error),
}

/// One completed conversion, ready for display.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub record: ConversionRecord,
    pub rate: f64,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} is {} {}",
            self.record.amount,
            self.record.base_currency,
            self.record.converted_amount,
            self.record.target_currency
        )
    }
}

pub struct ConversionEngine<'a, P> {
    provider: &'a P,
    log: &'a ConversionLog,
}

impl<'a, P: RateProvider> ConversionEngine<'a, P> {
    pub fn new(provider: &'a P, log: &'a ConversionLog) -> Self {
        Self { provider, log }
    }

    /// Converts `request.amount` from source to target at `date`'s rate
    /// and appends the result to the history file.
    ///
    /// The converted amount is rounded half-up to two decimal places.
    pub async fn execute(
        &self,
        request: &ConversionRequest,
        date: NaiveDate,
    ) -> Result<Conversion, ConvertError> {
        let table = self.provider.fetch_rate_table(&request.source, date).await?;
        let rate = *table
            .results
            .get(&request.target)
            .ok_or_else(|| ConvertError::RateNotFound {
                currency_source: request.source.clone(),
                target: request.target.clone(),
                date,
            })?;

        let amount: Decimal = request.amount.parse().map_err(|_| ConvertError::BadAmount {
            amount: request.amount.clone(),
        })?;
        let rate_decimal = Decimal::from_f64(rate).ok_or(ConvertError::BadRate { rate })?;

        let mut converted = (amount * rate_decimal)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        converted.rescale(2);

        let record = ConversionRecord {
            date,
            amount: request.amount.clone(),
            base_currency: request.source.clone(),
            target_currency: request.target.clone(),
            converted_amount: converted,
        };
        self.log.append(&record).map_err(ConvertError::Log)?;

        Ok(Conversion { record, rate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{CurrencyListResponse, RateTableResponse};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    struct FixedRates {
        results: BTreeMap<String, f64>,
    }

    impl FixedRates {
        fn new(rates: &[(&str, f64)]) -> Self {
            Self {
                results: rates
                    .iter()
                    .map(|(code, rate)| (code.to_string(), *rate))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl RateProvider for FixedRates {
        async fn fetch_currencies(&self) -> Result<CurrencyListResponse, RateError> {
            unimplemented!("the engine never asks for the catalog")
        }

        async fn fetch_rate_table(
            &self,
            _source: &str,
            _date: NaiveDate,
        ) -> Result<RateTableResponse, RateError> {
            Ok(RateTableResponse {
                results: self.results.clone(),
                rest: serde_json::Map::new(),
            })
        }
    }

    fn request(amount: &str, source: &str, target: &str) -> ConversionRequest {
        ConversionRequest {
            amount: amount.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn converts_and_logs() {
        let dir = tempdir().unwrap();
        let log = ConversionLog::new(dir.path().join("conversions.json"));
        let provider = FixedRates::new(&[("EUR", 0.90)]);
        let engine = ConversionEngine::new(&provider, &log);

        let conversion = engine
            .execute(&request("100", "USD", "EUR"), date())
            .await
            .unwrap();

        assert_eq!(conversion.rate, 0.90);
        assert_eq!(conversion.to_string(), "100 USD is 90.00 EUR");

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], conversion.record);
        assert_eq!(records[0].base_currency, "USD");
        assert_eq!(records[0].converted_amount, Decimal::new(9000, 2));
    }

    #[tokio::test]
    async fn midpoint_rounds_away_from_zero() {
        let dir = tempdir().unwrap();
        let log = ConversionLog::new(dir.path().join("conversions.json"));
        // 0.25 * 0.5 = 0.125, a true midpoint at two decimal places
        let provider = FixedRates::new(&[("EUR", 0.5)]);
        let engine = ConversionEngine::new(&provider, &log);

        let conversion = engine
            .execute(&request("0.25", "USD", "EUR"), date())
            .await
            .unwrap();

        assert_eq!(conversion.record.converted_amount, Decimal::new(13, 2));
        assert_eq!(conversion.to_string(), "0.25 USD is 0.13 EUR");
    }

    #[tokio::test]
    async fn missing_target_is_a_clean_error() {
        let dir = tempdir().unwrap();
        let log = ConversionLog::new(dir.path().join("conversions.json"));
        let provider = FixedRates::new(&[("EUR", 0.90)]);
        let engine = ConversionEngine::new(&provider, &log);

        let err = engine
            .execute(&request("100", "USD", "JPY"), date())
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::RateNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "no JPY rate published for USD on 2024-01-01"
        );
        // Nothing is logged for a failed conversion.
        assert!(log.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_propagated() {
        struct Failing;

        #[async_trait]
        impl RateProvider for Failing {
            async fn fetch_currencies(&self) -> Result<CurrencyListResponse, RateError> {
                unimplemented!()
            }

            async fn fetch_rate_table(
                &self,
                _source: &str,
                _date: NaiveDate,
            ) -> Result<RateTableResponse, RateError> {
                Err(RateError::Status {
                    status: 404,
                    body: "No data".to_string(),
                })
            }
        }

        let dir = tempdir().unwrap();
        let log = ConversionLog::new(dir.path().join("conversions.json"));
        let engine = ConversionEngine::new(&Failing, &log);

        let err = engine
            .execute(&request("100", "USD", "EUR"), date())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "server returned HTTP 404: No data");
    }
}
