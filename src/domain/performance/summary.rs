use super::stats::Stats;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Performance metrics for one value series (the regime portfolio or a
/// benchmark).
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub observations: usize,
    pub final_value: Decimal,
    pub total_return_pct: Decimal,
    pub cagr_pct: f64,
    pub max_drawdown_pct: Decimal,
    pub annualized_volatility_pct: f64,
    pub sharpe_ratio: Decimal,
}

impl PerformanceSummary {
    /// Compute metrics from a date-ordered value series. None for an empty
    /// series or a non-positive starting value.
    pub fn from_series(series: &[(NaiveDate, Decimal)]) -> Option<Self> {
        let (first_date, initial) = *series.first()?;
        let (last_date, final_value) = *series.last()?;
        if initial <= Decimal::ZERO {
            return None;
        }

        let values: Vec<Decimal> = series.iter().map(|(_, v)| *v).collect();
        let returns = Stats::period_returns(&values);

        let total_return_pct = (final_value / initial - Decimal::ONE) * dec!(100);

        let days = (last_date - first_date).num_days();
        let cagr_pct = if days > 0 {
            let growth = (final_value / initial).to_f64().unwrap_or(1.0);
            (growth.powf(365.0 / days as f64) - 1.0) * 100.0
        } else {
            0.0
        };

        Some(Self {
            observations: series.len(),
            final_value,
            total_return_pct,
            cagr_pct,
            max_drawdown_pct: Stats::max_drawdown_pct(&values),
            annualized_volatility_pct: Stats::annualized_volatility_pct(&returns),
            sharpe_ratio: Stats::sharpe_ratio(&returns, true),
        })
    }
}
