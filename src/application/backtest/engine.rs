//! Backtest engine.
//!
//! Replays the classifier day-by-day over a snapshot series: classify,
//! look up the target allocation, mark holdings to market, rebalance per
//! policy. Benchmark portfolios run beside it on the same price table
//! without regime switching.

use crate::application::backtest::result::{BacktestEntry, BacktestResult};
use crate::domain::allocation::{
    Allocation, AllocationTable, CASH_TICKER, RebalancePolicy,
};
use crate::domain::classifier::RegimeClassifier;
use crate::domain::errors::BacktestError;
use crate::domain::indicators::IndicatorSeries;
use crate::domain::prices::PriceTable;
use crate::domain::regime::Regime;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// A static comparison portfolio: bought on the first simulated day and held.
#[derive(Debug, Clone)]
pub struct BenchmarkSpec {
    pub name: String,
    pub allocation: Allocation,
}

impl BenchmarkSpec {
    pub fn new(name: &str, allocation: Allocation) -> Self {
        Self {
            name: name.to_string(),
            allocation,
        }
    }
}

/// The standard comparison set: the broad index alone, and a balanced
/// 60/40 equity/bond mix.
pub fn default_benchmarks() -> Vec<BenchmarkSpec> {
    let spy = Allocation::new("SPY benchmark", vec![("SPY".to_string(), 1.0)])
        .expect("static benchmark weights sum to 1.0");
    let balanced = Allocation::new(
        "60/40 benchmark",
        vec![("SPY".to_string(), 0.6), ("TLT".to_string(), 0.4)],
    )
    .expect("static benchmark weights sum to 1.0");

    vec![
        BenchmarkSpec::new("SPY", spy),
        BenchmarkSpec::new("60/40", balanced),
    ]
}

/// Instrument units plus a cash balance. Weights drift with prices between
/// rebalances; a rebalance resets them to the target allocation.
#[derive(Debug, Clone, Default)]
struct Holdings {
    cash: Decimal,
    units: HashMap<String, Decimal>,
}

impl Holdings {
    fn market_value(&self, prices: &PriceTable, date: NaiveDate) -> Decimal {
        let mut value = self.cash;
        for (ticker, units) in &self.units {
            if let Some(close) = prices.close_on_or_before(ticker, date) {
                value += units * close;
            }
        }
        value
    }

    fn rebalance(
        &mut self,
        target: &Allocation,
        value: Decimal,
        prices: &PriceTable,
        date: NaiveDate,
    ) {
        self.units.clear();
        self.cash = Decimal::ZERO;
        let mut allocated = Decimal::ZERO;

        for (ticker, weight) in target.iter() {
            let weight = Decimal::from_f64_retain(*weight).unwrap_or(Decimal::ZERO);
            let slice = value * weight;

            if ticker == CASH_TICKER {
                self.cash += slice;
                allocated += slice;
                continue;
            }

            match prices.close_on_or_before(ticker, date) {
                Some(close) if close > Decimal::ZERO => {
                    self.units.insert(ticker.clone(), slice / close);
                    allocated += slice;
                }
                _ => {
                    // Instrument has history but has not printed yet as of
                    // this date; its weight waits in cash.
                    warn!(
                        "No close for {} on or before {}; holding its weight in cash",
                        ticker, date
                    );
                    self.cash += slice;
                    allocated += slice;
                }
            }
        }

        // Conversion residue stays in cash; weights never leverage.
        self.cash += value - allocated;
    }
}

pub struct BacktestEngine {
    classifier: RegimeClassifier,
    allocations: AllocationTable,
    benchmarks: Vec<BenchmarkSpec>,
    policy: RebalancePolicy,
}

impl BacktestEngine {
    pub fn new(
        classifier: RegimeClassifier,
        allocations: AllocationTable,
        benchmarks: Vec<BenchmarkSpec>,
        policy: RebalancePolicy,
    ) -> Self {
        Self {
            classifier,
            allocations,
            benchmarks,
            policy,
        }
    }

    /// Run the simulation over `series`, starting from `initial_capital`.
    ///
    /// Fails before touching any state when the series is empty or when a
    /// required instrument has no price history at all.
    pub fn run(
        &self,
        series: &IndicatorSeries,
        prices: &PriceTable,
        initial_capital: Decimal,
    ) -> Result<BacktestResult, BacktestError> {
        if series.is_empty() {
            return Err(BacktestError::InsufficientData);
        }
        self.check_price_history(prices)?;

        info!(
            "Backtest: {} snapshots, {} benchmark(s), rebalance {}",
            series.len(),
            self.benchmarks.len(),
            self.policy
        );

        let mut portfolio = Holdings::default();
        let mut benchmark_holdings: Vec<Holdings> = self
            .benchmarks
            .iter()
            .map(|_| Holdings::default())
            .collect();

        let mut entries = Vec::with_capacity(series.len());
        let mut held_regime: Option<Regime> = None;
        let mut steps_since_rebalance = 0usize;

        for snapshot in series.iter() {
            let date = snapshot.date;
            let regime = self.classifier.classify(snapshot);

            let value = match held_regime {
                None => {
                    portfolio.rebalance(
                        self.allocations.allocate(regime),
                        initial_capital,
                        prices,
                        date,
                    );
                    for (spec, holdings) in
                        self.benchmarks.iter().zip(benchmark_holdings.iter_mut())
                    {
                        holdings.rebalance(&spec.allocation, initial_capital, prices, date);
                    }
                    held_regime = Some(regime);
                    initial_capital
                }
                Some(current) => {
                    let value = portfolio.market_value(prices, date);
                    steps_since_rebalance += 1;

                    let regime_changed = regime != current;
                    if self
                        .policy
                        .should_rebalance(regime_changed, steps_since_rebalance)
                    {
                        debug!(
                            "{}: rebalancing {} -> {} at value {}",
                            date, current, regime, value
                        );
                        portfolio.rebalance(
                            self.allocations.allocate(regime),
                            value,
                            prices,
                            date,
                        );
                        steps_since_rebalance = 0;
                        held_regime = Some(regime);
                    }
                    value
                }
            };

            let benchmarks = self
                .benchmarks
                .iter()
                .zip(benchmark_holdings.iter())
                .map(|(spec, holdings)| {
                    (spec.name.clone(), holdings.market_value(prices, date))
                })
                .collect::<BTreeMap<_, _>>();

            entries.push(BacktestEntry {
                date,
                regime,
                portfolio_value: value,
                benchmarks,
            });
        }

        let result = BacktestResult {
            initial_capital,
            entries,
        };
        info!(
            "Backtest finished: final value {}",
            result.final_value().unwrap_or(Decimal::ZERO)
        );
        Ok(result)
    }

    fn check_price_history(&self, prices: &PriceTable) -> Result<(), BacktestError> {
        for regime in Regime::ALL {
            for ticker in self.allocations.allocate(regime).tickers() {
                if ticker != CASH_TICKER && !prices.has_history(ticker) {
                    return Err(BacktestError::MissingInstrumentData {
                        ticker: ticker.to_string(),
                        required_by: format!("the {} allocation", regime),
                    });
                }
            }
        }
        for spec in &self.benchmarks {
            for ticker in spec.allocation.tickers() {
                if ticker != CASH_TICKER && !prices.has_history(ticker) {
                    return Err(BacktestError::MissingInstrumentData {
                        ticker: ticker.to_string(),
                        required_by: format!("the {} benchmark", spec.name),
                    });
                }
            }
        }
        Ok(())
    }
}
