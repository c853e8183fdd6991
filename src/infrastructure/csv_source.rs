//! CSV-backed data sources.
//!
//! The external data-fetch layer drops provider series into two files under
//! a data directory: `indicators.csv` with columns
//! `date,unemployment_rate,yield_spread,vix` (cells may be empty on dates a
//! series did not print), and `prices.csv` with columns `date,ticker,close`
//! in long format. This adapter reads them, joins the broad-index closes
//! onto the indicator rows, and hands the result to the snapshot builder.

use crate::application::snapshot_builder::{IndicatorRow, SnapshotBuilder, SnapshotConfig};
use crate::domain::indicators::IndicatorSeries;
use crate::domain::ports::{IndicatorSource, PriceSource};
use crate::domain::prices::PriceTable;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct IndicatorCsvRow {
    date: NaiveDate,
    unemployment_rate: Option<f64>,
    yield_spread: Option<f64>,
    vix: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceCsvRow {
    date: NaiveDate,
    ticker: String,
    close: f64,
}

pub struct CsvDataSource {
    dir: PathBuf,
    index_ticker: String,
    snapshot_config: SnapshotConfig,
}

impl CsvDataSource {
    pub fn new(dir: &Path, index_ticker: &str, snapshot_config: SnapshotConfig) -> Self {
        Self {
            dir: dir.to_path_buf(),
            index_ticker: index_ticker.to_string(),
            snapshot_config,
        }
    }

    fn indicators_path(&self) -> PathBuf {
        self.dir.join("indicators.csv")
    }

    fn prices_path(&self) -> PathBuf {
        self.dir.join("prices.csv")
    }

    fn read_price_rows(&self) -> Result<Vec<PriceCsvRow>> {
        let path = self.prices_path();
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: PriceCsvRow =
                record.with_context(|| format!("Malformed row in {}", path.display()))?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Indicator rows joined with the broad-index closes, keyed by date so
    /// both files contribute observation dates.
    fn read_indicator_rows(&self) -> Result<Vec<IndicatorRow>> {
        let path = self.indicators_path();
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut merged: BTreeMap<NaiveDate, IndicatorRow> = BTreeMap::new();
        for record in reader.deserialize() {
            let row: IndicatorCsvRow =
                record.with_context(|| format!("Malformed row in {}", path.display()))?;
            merged.insert(
                row.date,
                IndicatorRow {
                    date: row.date,
                    unemployment_rate: row.unemployment_rate,
                    yield_spread: row.yield_spread,
                    vix: row.vix,
                    index_close: None,
                },
            );
        }

        for row in self.read_price_rows()? {
            if row.ticker != self.index_ticker {
                continue;
            }
            merged
                .entry(row.date)
                .or_insert(IndicatorRow {
                    date: row.date,
                    unemployment_rate: None,
                    yield_spread: None,
                    vix: None,
                    index_close: None,
                })
                .index_close = Some(row.close);
        }

        Ok(merged.into_values().collect())
    }
}

#[async_trait]
impl IndicatorSource for CsvDataSource {
    async fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<IndicatorSeries> {
        let rows = self.read_indicator_rows()?;
        info!(
            "CsvDataSource: {} indicator row(s) from {}",
            rows.len(),
            self.dir.display()
        );

        // Build over the full history so rolling windows warm up before the
        // requested range, then slice.
        let builder = SnapshotBuilder::new(self.snapshot_config)?;
        let series = builder.build(&rows)?;
        Ok(series.between(start, end))
    }
}

#[async_trait]
impl PriceSource for CsvDataSource {
    async fn fetch_prices(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable> {
        let mut table = PriceTable::new();
        for row in self.read_price_rows()? {
            let close = Decimal::from_f64_retain(row.close)
                .with_context(|| format!("Unrepresentable close for {}: {}", row.ticker, row.close))?;
            table.insert(&row.ticker, row.date, close);
        }
        Ok(table.restricted(tickers, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("indicators.csv"),
            "date,unemployment_rate,yield_spread,vix\n\
             2024-01-01,4.0,0.5,18.0\n\
             2024-01-02,,,19.0\n\
             2024-01-03,4.1,0.4,\n",
        )
        .unwrap();
        fs::write(
            dir.join("prices.csv"),
            "date,ticker,close\n\
             2024-01-01,SPY,470.0\n\
             2024-01-02,SPY,472.5\n\
             2024-01-03,SPY,471.0\n\
             2024-01-01,TLT,98.5\n\
             2024-01-03,TLT,99.0\n",
        )
        .unwrap();
    }

    fn small_config() -> SnapshotConfig {
        SnapshotConfig {
            rolling_min_window: 2,
            long_trend_window: 2,
            drawdown_window: 5,
            drawdown_trigger_pct: -20.0,
        }
    }

    fn fixture_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("macrofolio-csv-{}", name))
    }

    #[tokio::test]
    async fn test_fetch_builds_forward_filled_snapshots() {
        let dir = fixture_dir("fetch");
        write_fixture(&dir);
        let source = CsvDataSource::new(&dir, "SPY", small_config());

        let series = source.fetch(NaiveDate::MIN, NaiveDate::MAX).await.unwrap();
        assert_eq!(series.len(), 3);

        let last = series.last().unwrap();
        assert_eq!(last.unemployment_rate, 4.1);
        // VIX cell empty on day 3: previous print carries forward.
        assert_eq!(last.vix, 19.0);
    }

    #[tokio::test]
    async fn test_fetch_prices_filters_tickers_and_range() {
        let dir = fixture_dir("prices");
        write_fixture(&dir);
        let source = CsvDataSource::new(&dir, "SPY", small_config());

        let table = source
            .fetch_prices(
                &["TLT".to_string()],
                NaiveDate::MIN,
                NaiveDate::MAX,
            )
            .await
            .unwrap();

        assert!(table.has_history("TLT"));
        assert!(!table.has_history("SPY"));
        // Gap on Jan 2 carries the previous close.
        assert_eq!(
            table.close_on_or_before("TLT", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            Some(Decimal::from_f64_retain(98.5).unwrap())
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = fixture_dir("missing");
        fs::create_dir_all(&dir).unwrap();
        let _ = fs::remove_file(dir.join("indicators.csv"));
        let source = CsvDataSource::new(&dir, "SPY", small_config());

        let err = source
            .fetch(NaiveDate::MIN, NaiveDate::MAX)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("indicators.csv"));
    }
}
