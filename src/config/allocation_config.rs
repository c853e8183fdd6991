//! Allocation basket configuration.
//!
//! Baskets are a configuration concern, not part of the algorithmic
//! contract: a TOML file can override any default basket without a code
//! change. Unlisted regimes keep their defaults.

use crate::domain::allocation::AllocationTable;
use crate::domain::errors::ConfigurationError;
use crate::domain::regime::Regime;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct BasketFile {
    baskets: HashMap<String, HashMap<String, f64>>,
}

#[derive(Debug, Clone)]
pub struct AllocationConfig {
    baskets: HashMap<Regime, Vec<(String, f64)>>,
}

fn basket(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
    pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
}

impl Default for AllocationConfig {
    fn default() -> Self {
        let mut baskets = HashMap::new();
        baskets.insert(
            Regime::InflationShock,
            basket(&[("CASH", 0.70), ("GLD", 0.30)]),
        );
        baskets.insert(
            Regime::DeflationRecession,
            basket(&[("TLT", 0.50), ("GLD", 0.30), ("CASH", 0.20)]),
        );
        baskets.insert(
            Regime::ExtremeAccumulation,
            basket(&[("IWY", 0.45), ("QQQ", 0.25), ("WTMF", 0.20), ("CASH", 0.10)]),
        );
        baskets.insert(
            Regime::CautiousTrend,
            basket(&[("USMV", 0.40), ("XLP", 0.30), ("TLT", 0.30)]),
        );
        baskets.insert(
            Regime::CautiousVol,
            basket(&[("SPY", 0.60), ("WTMF", 0.25), ("CASH", 0.15)]),
        );
        baskets.insert(
            Regime::Neutral,
            basket(&[("SPY", 0.60), ("TLT", 0.30), ("GLD", 0.10)]),
        );
        Self { baskets }
    }
}

impl AllocationConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read basket file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse basket file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: BasketFile = toml::from_str(raw).context("Malformed basket TOML")?;

        let mut config = Self::default();
        for (label, weights) in file.baskets {
            let regime = Regime::from_str(&label).map_err(|_| {
                ConfigurationError::UnknownRegime {
                    label: label.clone(),
                }
            })?;
            config
                .baskets
                .insert(regime, weights.into_iter().collect());
        }
        Ok(config)
    }

    /// Validate every basket and produce the immutable lookup table.
    pub fn build_table(&self) -> Result<AllocationTable, ConfigurationError> {
        AllocationTable::new(self.baskets.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baskets_build_a_valid_table() {
        let table = AllocationConfig::default().build_table().unwrap();
        for regime in Regime::ALL {
            let allocation = table.allocate(regime);
            let sum: f64 = allocation.iter().map(|(_, w)| *w).sum();
            assert!((sum - 1.0).abs() < 1e-6, "{regime} sums to {sum}");
        }
    }

    #[test]
    fn test_toml_overrides_one_basket_and_keeps_the_rest() {
        let config = AllocationConfig::from_toml_str(
            "[baskets.neutral]\nSPY = 0.5\nTLT = 0.5\n",
        )
        .unwrap();
        let table = config.build_table().unwrap();

        assert_eq!(table.allocate(Regime::Neutral).weight("SPY"), Some(0.5));
        // Untouched regime keeps its default.
        assert_eq!(
            table.allocate(Regime::InflationShock).weight("CASH"),
            Some(0.70)
        );
    }

    #[test]
    fn test_unknown_regime_label_is_rejected() {
        let err =
            AllocationConfig::from_toml_str("[baskets.stagflation]\nGLD = 1.0\n").unwrap_err();
        assert!(err.to_string().contains("stagflation"));
    }

    #[test]
    fn test_bad_weight_sum_surfaces_at_table_construction() {
        let config =
            AllocationConfig::from_toml_str("[baskets.neutral]\nSPY = 0.5\n").unwrap();
        let err = config.build_table().unwrap_err();
        assert!(matches!(err, ConfigurationError::WeightSum { .. }));
    }
}
