use crate::domain::indicators::IndicatorSeries;
use crate::domain::ports::{IndicatorSource, PriceSource};
use crate::domain::prices::PriceTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// In-memory indicator source backed by a pre-built series.
#[derive(Clone)]
pub struct MockIndicatorSource {
    series: IndicatorSeries,
}

impl MockIndicatorSource {
    pub fn new(series: IndicatorSeries) -> Self {
        Self { series }
    }
}

#[async_trait]
impl IndicatorSource for MockIndicatorSource {
    async fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<IndicatorSeries> {
        Ok(self.series.between(start, end))
    }
}

/// In-memory price source backed by a pre-built table.
#[derive(Clone)]
pub struct MockPriceSource {
    table: PriceTable,
}

impl MockPriceSource {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_prices(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable> {
        Ok(self.table.restricted(tickers, start, end))
    }
}
