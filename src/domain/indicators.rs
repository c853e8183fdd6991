use crate::domain::errors::BacktestError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Point-in-time record of the macro/market values the classifier consumes.
///
/// Every field is populated before classification; missing source data is
/// forward-filled (or the day excluded) by the snapshot builder upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    /// Unemployment rate, percent.
    pub unemployment_rate: f64,
    /// Trailing rolling minimum of the unemployment rate over the configured
    /// lookback. Input to the Sahm Rule trigger.
    pub unemployment_rolling_min: f64,
    /// 10y-2y government yield spread, percent, signed.
    pub yield_spread: f64,
    /// Equity volatility index level.
    pub vix: f64,
    /// Short-term signal: the broad index sits in a deep drawdown from its
    /// trailing high.
    pub sharp_decline: bool,
    /// Long-term signal: the broad index closed below its long-term trend line.
    pub trend_broken: bool,
}

impl IndicatorSnapshot {
    /// Spread of the unemployment rate over its trailing rolling minimum,
    /// in percentage points.
    pub fn sahm_delta(&self) -> f64 {
        self.unemployment_rate - self.unemployment_rolling_min
    }
}

/// Time-ordered sequence of snapshots.
///
/// Construction enforces strictly increasing dates, so downstream consumers
/// never see duplicate or out-of-order observations.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    snapshots: Vec<IndicatorSnapshot>,
}

impl IndicatorSeries {
    pub fn new(snapshots: Vec<IndicatorSnapshot>) -> Result<Self, BacktestError> {
        for pair in snapshots.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(BacktestError::DataOrder {
                    prev: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { snapshots })
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndicatorSnapshot> {
        self.snapshots.iter()
    }

    pub fn first(&self) -> Option<&IndicatorSnapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&IndicatorSnapshot> {
        self.snapshots.last()
    }

    /// Sub-series restricted to `[start, end]`, both inclusive.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let snapshots = self
            .snapshots
            .iter()
            .filter(|s| s.date >= start && s.date <= end)
            .copied()
            .collect();
        // A filtered subset of an ordered series stays ordered.
        Self { snapshots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(date: NaiveDate) -> IndicatorSnapshot {
        IndicatorSnapshot {
            date,
            unemployment_rate: 4.0,
            unemployment_rolling_min: 3.8,
            yield_spread: 0.5,
            vix: 18.0,
            sharp_decline: false,
            trend_broken: false,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_ordered_series_is_accepted() {
        let series = IndicatorSeries::new(vec![snapshot(day(1)), snapshot(day(2))]).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_duplicate_date_is_rejected() {
        let err = IndicatorSeries::new(vec![snapshot(day(3)), snapshot(day(3))]).unwrap_err();
        assert!(matches!(err, BacktestError::DataOrder { .. }));
    }

    #[test]
    fn test_decreasing_date_is_rejected() {
        let err = IndicatorSeries::new(vec![snapshot(day(5)), snapshot(day(4))]).unwrap_err();
        assert!(matches!(err, BacktestError::DataOrder { .. }));
    }

    #[test]
    fn test_between_is_inclusive() {
        let series =
            IndicatorSeries::new(vec![snapshot(day(1)), snapshot(day(2)), snapshot(day(3))])
                .unwrap();
        let sliced = series.between(day(2), day(3));
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.first().unwrap().date, day(2));
    }

    #[test]
    fn test_sahm_delta() {
        let mut s = snapshot(day(1));
        s.unemployment_rate = 4.1;
        s.unemployment_rolling_min = 3.5;
        assert!((s.sahm_delta() - 0.6).abs() < 1e-12);
    }
}
