//! Report rendering for backtest results.
//!
//! Provides formatted console output and JSON export; the records are plain
//! serializable structures for the external UI/alerting layer.

use crate::application::backtest::BacktestResult;
use crate::domain::allocation::{Allocation, AllocationTable};
use crate::domain::performance::PerformanceSummary;
use crate::domain::regime::Regime;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub current_regime: Regime,
    pub current_allocation: Allocation,
    pub portfolio: PerformanceSummary,
    pub benchmarks: BTreeMap<String, PerformanceSummary>,
    pub regime_days: BTreeMap<String, usize>,
}

impl BacktestReport {
    /// None only for an empty result, which the engine never produces.
    pub fn from_result(result: &BacktestResult, table: &AllocationTable) -> Option<Self> {
        let current_regime = result.final_regime()?;
        Some(Self {
            current_regime,
            current_allocation: table.allocate(current_regime).clone(),
            portfolio: result.portfolio_summary()?,
            benchmarks: result.benchmark_summaries(),
            regime_days: result.regime_days(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize backtest report")
    }

    pub fn print(&self) {
        println!("\n📊 Backtest Report");
        println!(
            "  Current regime:  {} ({})",
            self.current_regime,
            self.current_regime.description()
        );
        print!("  Allocation:      ");
        let weights: Vec<String> = self
            .current_allocation
            .iter()
            .map(|(t, w)| format!("{} {:.0}%", t, w * 100.0))
            .collect();
        println!("{}", weights.join(", "));

        println!("\n  Strategy:");
        Self::print_summary(&self.portfolio);
        for (name, summary) in &self.benchmarks {
            println!("\n  Benchmark {}:", name);
            Self::print_summary(summary);
        }

        println!("\n  Days per regime:");
        for (regime, days) in &self.regime_days {
            println!("    {:<22} {}", regime, days);
        }
    }

    fn print_summary(summary: &PerformanceSummary) {
        println!("    Final value:     {:.2}", summary.final_value);
        println!("    Total return:    {:.2}%", summary.total_return_pct);
        println!("    CAGR:            {:.2}%", summary.cagr_pct);
        println!("    Max drawdown:    {:.2}%", summary.max_drawdown_pct);
        println!(
            "    Volatility (ann): {:.2}%",
            summary.annualized_volatility_pct
        );
        println!("    Sharpe:          {:.2}", summary.sharpe_ratio);
    }
}

/// Snapshot-of-now output for the classify command.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeReport {
    pub date: chrono::NaiveDate,
    pub regime: Regime,
    pub allocation: Allocation,
}

impl RegimeReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize regime report")
    }

    pub fn print(&self) {
        println!("\n🏁 {} regime: {}", self.date, self.regime);
        println!("  {}", self.regime.description());
        println!("  Recommended allocation:");
        for (ticker, weight) in self.allocation.iter() {
            println!("    {:<6} {:>5.1}%", ticker, weight * 100.0);
        }
    }
}
