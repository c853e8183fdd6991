use crate::domain::errors::ConfigurationError;
use crate::domain::regime::Regime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Synthetic zero-return instrument. Exempt from price-history checks.
pub const CASH_TICKER: &str = "CASH";

/// Tolerance for the weights-sum-to-one invariant.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Target portfolio weights for one regime. Immutable once constructed;
/// weights are validated to sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    weights: BTreeMap<String, f64>,
}

impl Allocation {
    pub fn new(
        regime_label: &str,
        weights: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self, ConfigurationError> {
        let weights: BTreeMap<String, f64> = weights.into_iter().collect();

        if weights.is_empty() {
            return Err(ConfigurationError::EmptyBasket {
                regime: regime_label.to_string(),
            });
        }
        for (ticker, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigurationError::NegativeWeight {
                    regime: regime_label.to_string(),
                    ticker: ticker.clone(),
                    weight: *weight,
                });
            }
        }

        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigurationError::WeightSum {
                regime: regime_label.to_string(),
                sum,
            });
        }

        Ok(Self { weights })
    }

    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.weights.get(ticker).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.weights.iter()
    }

    /// Tickers in the basket, cash included.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Static mapping from regime to target allocation.
///
/// Construction validates every basket and requires all six regimes, so
/// `allocate` is an infallible lookup afterwards.
#[derive(Debug, Clone)]
pub struct AllocationTable {
    baskets: HashMap<Regime, Allocation>,
}

impl AllocationTable {
    pub fn new(
        baskets: HashMap<Regime, Vec<(String, f64)>>,
    ) -> Result<Self, ConfigurationError> {
        let mut validated = HashMap::new();
        for regime in Regime::ALL {
            let basket = baskets
                .get(&regime)
                .ok_or_else(|| ConfigurationError::MissingBasket {
                    regime: regime.to_string(),
                })?;
            validated.insert(
                regime,
                Allocation::new(&regime.to_string(), basket.iter().cloned())?,
            );
        }
        Ok(Self { baskets: validated })
    }

    /// Look up the target allocation for a regime.
    ///
    /// Panics only on a broken construction invariant; `new` populates every
    /// regime before the table is handed out.
    pub fn allocate(&self, regime: Regime) -> &Allocation {
        self.baskets
            .get(&regime)
            .expect("table construction populates every regime")
    }

    /// Every real instrument referenced by any basket, cash excluded.
    pub fn instruments(&self) -> BTreeSet<String> {
        self.baskets
            .values()
            .flat_map(|a| a.tickers())
            .filter(|t| *t != CASH_TICKER)
            .map(str::to_string)
            .collect()
    }
}

/// Rule governing when portfolio weights reset to the target allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalancePolicy {
    /// Rebalance only when the classified regime changes. Avoids needless
    /// transaction churn while a regime persists.
    OnRegimeChange,
    /// Rebalance every `n` steps regardless of regime.
    Every(usize),
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        RebalancePolicy::OnRegimeChange
    }
}

impl RebalancePolicy {
    pub fn should_rebalance(&self, regime_changed: bool, steps_since_last: usize) -> bool {
        match self {
            RebalancePolicy::OnRegimeChange => regime_changed,
            RebalancePolicy::Every(n) => steps_since_last >= *n,
        }
    }
}

impl fmt::Display for RebalancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalancePolicy::OnRegimeChange => write!(f, "regime-change"),
            RebalancePolicy::Every(n) => write!(f, "every:{}", n),
        }
    }
}

impl FromStr for RebalancePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower == "regime-change" {
            return Ok(RebalancePolicy::OnRegimeChange);
        }
        if let Some(n) = lower.strip_prefix("every:") {
            let n: usize = n
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid rebalance cadence: {}", s))?;
            if n == 0 {
                anyhow::bail!("Rebalance cadence must be at least 1 step");
            }
            return Ok(RebalancePolicy::Every(n));
        }
        anyhow::bail!(
            "Invalid REBALANCE_POLICY: {}. Must be 'regime-change' or 'every:<n>'",
            s
        )
    }
}
