//! Configuration module for Macrofolio.
//!
//! All classifier thresholds, signal windows and allocation baskets are
//! externally supplied with documented defaults; absent configuration uses
//! the defaults. Scalar settings come from environment variables, baskets
//! from an optional TOML file.

mod allocation_config;

pub use allocation_config::AllocationConfig;

use crate::application::snapshot_builder::SnapshotConfig;
use crate::domain::allocation::RebalancePolicy;
use crate::domain::classifier::ClassifierConfig;
use anyhow::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub snapshot: SnapshotConfig,
    pub allocations: AllocationConfig,
    pub initial_capital: Decimal,
    pub rebalance: RebalancePolicy,
    /// Broad equity index the trend signals are derived from.
    pub index_ticker: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// documented defaults. Semantic validation happens where the values are
    /// consumed (classifier and snapshot-builder construction).
    pub fn from_env() -> Result<Self> {
        let classifier_defaults = ClassifierConfig::default();
        let classifier = ClassifierConfig {
            sahm_margin: parse_env("SAHM_MARGIN", classifier_defaults.sahm_margin)?,
            vix_extreme: parse_env("VIX_EXTREME", classifier_defaults.vix_extreme)?,
            vix_elevated: parse_env("VIX_ELEVATED", classifier_defaults.vix_elevated)?,
            yield_shock_bps: parse_env("YIELD_SHOCK_BPS", classifier_defaults.yield_shock_bps)?,
        };

        let snapshot_defaults = SnapshotConfig::default();
        let snapshot = SnapshotConfig {
            rolling_min_window: parse_env(
                "ROLLING_MIN_WINDOW",
                snapshot_defaults.rolling_min_window,
            )?,
            long_trend_window: parse_env(
                "LONG_TREND_WINDOW",
                snapshot_defaults.long_trend_window,
            )?,
            drawdown_window: parse_env("DRAWDOWN_WINDOW", snapshot_defaults.drawdown_window)?,
            drawdown_trigger_pct: parse_env(
                "DRAWDOWN_TRIGGER_PCT",
                snapshot_defaults.drawdown_trigger_pct,
            )?,
        };

        let allocations = match env::var("ALLOCATIONS_FILE") {
            Ok(path) => AllocationConfig::from_path(&PathBuf::from(path))?,
            Err(_) => AllocationConfig::default(),
        };

        Ok(Self {
            classifier,
            snapshot,
            allocations,
            initial_capital: parse_env("INITIAL_CAPITAL", dec!(100000))?,
            rebalance: parse_env("REBALANCE_POLICY", RebalancePolicy::OnRegimeChange)?,
            index_ticker: env::var("INDEX_TICKER").unwrap_or_else(|_| "SPY".to_string()),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
        })
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    <T as FromStr>::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}={}: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; each one uses its own key.

    #[test]
    fn test_parse_env_prefers_the_variable() {
        unsafe { env::set_var("MACROFOLIO_TEST_MARGIN", "0.75") };
        let value: f64 = parse_env("MACROFOLIO_TEST_MARGIN", 0.5).unwrap();
        assert_eq!(value, 0.75);
        unsafe { env::remove_var("MACROFOLIO_TEST_MARGIN") };
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: f64 = parse_env("MACROFOLIO_TEST_ABSENT", 0.5).unwrap();
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_parse_env_reports_malformed_values() {
        unsafe { env::set_var("MACROFOLIO_TEST_BAD", "not-a-number") };
        let err = parse_env::<f64>("MACROFOLIO_TEST_BAD", 0.5).unwrap_err();
        assert!(err.to_string().contains("MACROFOLIO_TEST_BAD"));
        unsafe { env::remove_var("MACROFOLIO_TEST_BAD") };
    }
}
