//! Shapes raw indicator columns into classifier-ready snapshots.
//!
//! Macro series print monthly and markets print daily, so the builder
//! forward-fills each column, derives the rolling-minimum and trend signals,
//! and drops leading rows until every field is defined. No partial snapshot
//! ever reaches the classifier.

use crate::domain::errors::{BacktestError, ConfigurationError};
use crate::domain::indicators::{IndicatorSeries, IndicatorSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{Maximum, Minimum, SimpleMovingAverage};
use tracing::warn;

/// Windows and triggers for derived signals. All counted in data rows
/// (trading sessions for daily input).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Lookback for the unemployment rolling minimum. 252 sessions is about
    /// twelve months of daily data.
    pub rolling_min_window: usize,
    /// Long-term trend line length for the broad index.
    pub long_trend_window: usize,
    /// Lookback for the trailing high used by the drawdown signal.
    pub drawdown_window: usize,
    /// Drawdown at or below this percent flags a sharp decline.
    pub drawdown_trigger_pct: f64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            rolling_min_window: 252,
            long_trend_window: 200,
            drawdown_window: 252,
            drawdown_trigger_pct: -20.0,
        }
    }
}

impl SnapshotConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.rolling_min_window == 0 {
            return Err(ConfigurationError::InvalidWindow {
                name: "rolling_min_window",
                value: self.rolling_min_window,
            });
        }
        if self.long_trend_window == 0 {
            return Err(ConfigurationError::InvalidWindow {
                name: "long_trend_window",
                value: self.long_trend_window,
            });
        }
        if self.drawdown_window == 0 {
            return Err(ConfigurationError::InvalidWindow {
                name: "drawdown_window",
                value: self.drawdown_window,
            });
        }
        if !self.drawdown_trigger_pct.is_finite() || self.drawdown_trigger_pct >= 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                name: "drawdown_trigger_pct",
                value: self.drawdown_trigger_pct,
            });
        }
        Ok(())
    }
}

/// One raw observation row as delivered by the data-fetch layer. Any column
/// may be missing on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub unemployment_rate: Option<f64>,
    pub yield_spread: Option<f64>,
    pub vix: Option<f64>,
    /// Close of the broad equity index the trend signals are derived from.
    pub index_close: Option<f64>,
}

pub struct SnapshotBuilder {
    config: SnapshotConfig,
}

impl SnapshotBuilder {
    pub fn new(config: SnapshotConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build an ordered snapshot series from raw rows.
    ///
    /// Rows must arrive in strictly increasing date order. Rows observed
    /// before every column has printed at least once are excluded.
    pub fn build(&self, rows: &[IndicatorRow]) -> Result<IndicatorSeries, BacktestError> {
        let mut rolling_min = Minimum::new(self.config.rolling_min_window)
            .expect("window validated at construction");
        let mut trend_line = SimpleMovingAverage::new(self.config.long_trend_window)
            .expect("window validated at construction");
        let mut trailing_high = Maximum::new(self.config.drawdown_window)
            .expect("window validated at construction");

        let mut last_unemployment = None;
        let mut last_spread = None;
        let mut last_vix = None;
        let mut last_close = None;
        let mut closes_seen = 0usize;
        let mut prev_date: Option<NaiveDate> = None;
        let mut skipped = 0usize;

        let mut snapshots = Vec::with_capacity(rows.len());

        for row in rows {
            if let Some(prev) = prev_date {
                if row.date <= prev {
                    return Err(BacktestError::DataOrder {
                        prev,
                        next: row.date,
                    });
                }
            }
            prev_date = Some(row.date);

            // Forward-fill each column independently.
            if row.unemployment_rate.is_some() {
                last_unemployment = row.unemployment_rate;
            }
            if row.yield_spread.is_some() {
                last_spread = row.yield_spread;
            }
            if row.vix.is_some() {
                last_vix = row.vix;
            }
            if row.index_close.is_some() {
                last_close = row.index_close;
            }

            let unemployment_min = last_unemployment.map(|u| rolling_min.next(u));

            let trend = last_close.map(|close| {
                closes_seen += 1;
                let sma = trend_line.next(close);
                let high = trailing_high.next(close);
                let drawdown_pct = if high > 0.0 {
                    (close / high - 1.0) * 100.0
                } else {
                    0.0
                };
                // The trend line needs a full window before a break counts.
                let trend_broken = closes_seen >= self.config.long_trend_window && close < sma;
                let sharp_decline = drawdown_pct <= self.config.drawdown_trigger_pct;
                (trend_broken, sharp_decline)
            });

            match (
                last_unemployment,
                unemployment_min,
                last_spread,
                last_vix,
                trend,
            ) {
                (
                    Some(unemployment_rate),
                    Some(unemployment_rolling_min),
                    Some(yield_spread),
                    Some(vix),
                    Some((trend_broken, sharp_decline)),
                ) => snapshots.push(IndicatorSnapshot {
                    date: row.date,
                    unemployment_rate,
                    unemployment_rolling_min,
                    yield_spread,
                    vix,
                    sharp_decline,
                    trend_broken,
                }),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                "Snapshot builder excluded {} leading row(s) with incomplete columns",
                skipped
            );
        }

        IndicatorSeries::new(snapshots)
    }
}
