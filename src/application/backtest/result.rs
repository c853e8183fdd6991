use crate::domain::performance::PerformanceSummary;
use crate::domain::regime::Regime;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One simulated day: the classified regime and the marked value of the
/// regime portfolio and of every benchmark.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestEntry {
    pub date: NaiveDate,
    pub regime: Regime,
    pub portfolio_value: Decimal,
    pub benchmarks: BTreeMap<String, Decimal>,
}

/// Terminal output artifact of one simulation run. Append-only while the
/// engine runs; immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub initial_capital: Decimal,
    pub entries: Vec<BacktestEntry>,
}

impl BacktestResult {
    pub fn final_value(&self) -> Option<Decimal> {
        self.entries.last().map(|e| e.portfolio_value)
    }

    pub fn final_regime(&self) -> Option<Regime> {
        self.entries.last().map(|e| e.regime)
    }

    /// The regime portfolio as a date-ordered value series.
    pub fn portfolio_series(&self) -> Vec<(NaiveDate, Decimal)> {
        self.entries
            .iter()
            .map(|e| (e.date, e.portfolio_value))
            .collect()
    }

    /// A benchmark as a date-ordered value series. Empty when the name is
    /// unknown.
    pub fn benchmark_series(&self, name: &str) -> Vec<(NaiveDate, Decimal)> {
        self.entries
            .iter()
            .filter_map(|e| e.benchmarks.get(name).map(|v| (e.date, *v)))
            .collect()
    }

    pub fn benchmark_names(&self) -> Vec<String> {
        self.entries
            .first()
            .map(|e| e.benchmarks.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn portfolio_summary(&self) -> Option<PerformanceSummary> {
        PerformanceSummary::from_series(&self.portfolio_series())
    }

    pub fn benchmark_summaries(&self) -> BTreeMap<String, PerformanceSummary> {
        self.benchmark_names()
            .into_iter()
            .filter_map(|name| {
                PerformanceSummary::from_series(&self.benchmark_series(&name))
                    .map(|summary| (name, summary))
            })
            .collect()
    }

    /// Days spent in each regime over the run.
    pub fn regime_days(&self) -> BTreeMap<String, usize> {
        let mut days: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &self.entries {
            *days.entry(entry.regime.to_string()).or_default() += 1;
        }
        days
    }
}
