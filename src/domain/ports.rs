use crate::domain::indicators::IndicatorSeries;
use crate::domain::prices::PriceTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Injected data-source capability for indicator observations.
///
/// Implementations own fetching, caching and retries; the core only sees a
/// validated, time-ordered series.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<IndicatorSeries>;
}

/// Injected data-source capability for instrument price history.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable>;
}
