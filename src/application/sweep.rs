use crate::application::backtest::BacktestEngine;
use crate::domain::allocation::{AllocationTable, RebalancePolicy};
use crate::domain::classifier::{ClassifierConfig, RegimeClassifier};
use crate::domain::indicators::IndicatorSeries;
use crate::domain::performance::PerformanceSummary;
use crate::domain::prices::PriceTable;
use anyhow::Result;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::info;

/// One classifier configuration to evaluate.
#[derive(Debug, Clone)]
pub struct SweepCandidate {
    pub label: String,
    pub thresholds: ClassifierConfig,
}

/// Result of a single run in a sweep. Errors for individual candidates are
/// captured here so partial results survive.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub label: String,
    pub result: Result<PerformanceSummary, String>,
}

/// Parallel sweep over classifier configurations.
///
/// Backtest runs share no mutable state, so candidates are evaluated
/// concurrently with Rayon. Each run gets its own classifier and engine.
pub struct SweepRunner {
    allocations: AllocationTable,
    policy: RebalancePolicy,
    initial_capital: Decimal,
}

impl SweepRunner {
    pub fn new(
        allocations: AllocationTable,
        policy: RebalancePolicy,
        initial_capital: Decimal,
    ) -> Self {
        Self {
            allocations,
            policy,
            initial_capital,
        }
    }

    pub fn run_parallel(
        &self,
        candidates: Vec<SweepCandidate>,
        series: &IndicatorSeries,
        prices: &PriceTable,
    ) -> Vec<SweepOutcome> {
        info!("Sweep: evaluating {} configuration(s)", candidates.len());

        candidates
            .into_par_iter()
            .map(|candidate| {
                let result = self
                    .run_single(candidate.thresholds, series, prices)
                    .map_err(|e| e.to_string());
                SweepOutcome {
                    label: candidate.label,
                    result,
                }
            })
            .collect()
    }

    fn run_single(
        &self,
        thresholds: ClassifierConfig,
        series: &IndicatorSeries,
        prices: &PriceTable,
    ) -> Result<PerformanceSummary> {
        let classifier = RegimeClassifier::new(thresholds)?;
        let engine = BacktestEngine::new(
            classifier,
            self.allocations.clone(),
            Vec::new(),
            self.policy,
        );
        let result = engine.run(series, prices, self.initial_capital)?;
        result
            .portfolio_summary()
            .ok_or_else(|| anyhow::anyhow!("backtest produced no value series"))
    }
}
