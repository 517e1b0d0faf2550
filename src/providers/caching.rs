use crate::core::rates::{CurrencyListResponse, RateError, RateProvider, RateTableResponse};
use crate::store::DiskCache;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Read-through disk cache over any [`RateProvider`].
///
/// The currency catalog is keyed by the run date, so it is refreshed once
/// per calendar day. Rate tables are keyed by (source, date); rates for a
/// past date never change, so those entries never expire.
pub struct CachingRateProvider<P> {
    inner: P,
    cache: DiskCache,
    today: NaiveDate,
}

impl<P> CachingRateProvider<P> {
    pub fn new(inner: P, cache: DiskCache, today: NaiveDate) -> Self {
        Self {
            inner,
            cache,
            today,
        }
    }
}

#[async_trait]
impl<P: RateProvider> RateProvider for CachingRateProvider<P> {
    async fn fetch_currencies(&self) -> Result<CurrencyListResponse, RateError> {
        if let Some(cached) = self.cache.read_currencies(self.today) {
            debug!("using cached currency catalog for {}", self.today);
            return Ok(cached);
        }
        let document = self.inner.fetch_currencies().await?;
        if let Err(e) = self.cache.write_currencies(self.today, &document) {
            warn!(error = %e, "could not cache the currency catalog");
        }
        Ok(document)
    }

    async fn fetch_rate_table(
        &self,
        source: &str,
        date: NaiveDate,
    ) -> Result<RateTableResponse, RateError> {
        if let Some(cached) = self.cache.read_rate_table(source, date) {
            debug!("using cached {source} rate table for {date}");
            return Ok(cached);
        }
        let document = self.inner.fetch_rate_table(source, date).await?;
        if let Err(e) = self.cache.write_rate_table(source, date, &document) {
            warn!(error = %e, "could not cache the {source} rate table for {date}");
        }
        Ok(document)
    }
}
