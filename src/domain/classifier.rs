//! Macro regime classifier.
//!
//! An ordered sequence of guard conditions evaluated top to bottom; the first
//! matching guard wins. Threshold boundaries are inclusive on the triggering
//! side so that exact threshold values still classify deterministically.

use crate::domain::errors::ConfigurationError;
use crate::domain::indicators::IndicatorSnapshot;
use crate::domain::regime::Regime;
use serde::{Deserialize, Serialize};

/// Classifier thresholds.
///
/// All values are human-authored constants, not fitted parameters. Defaults
/// follow the strategy documentation; every field can be overridden through
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Sahm Rule margin: unemployment rate above its trailing rolling minimum
    /// by at least this many percentage points signals recession.
    pub sahm_margin: f64,
    /// VIX level at or above which volatility counts as extreme.
    pub vix_extreme: f64,
    /// VIX level at or above which volatility counts as elevated.
    pub vix_elevated: f64,
    /// 10y-2y spread, in basis points, at or below which the curve signals
    /// acute tightening stress. Negative: an inversion.
    pub yield_shock_bps: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sahm_margin: 0.5,
            vix_extreme: 35.0,
            vix_elevated: 25.0,
            yield_shock_bps: -100.0,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.sahm_margin.is_finite() || self.sahm_margin <= 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                name: "sahm_margin",
                value: self.sahm_margin,
            });
        }
        if !self.vix_elevated.is_finite() || self.vix_elevated <= 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                name: "vix_elevated",
                value: self.vix_elevated,
            });
        }
        if !self.vix_extreme.is_finite() || self.vix_extreme < self.vix_elevated {
            return Err(ConfigurationError::InvalidThreshold {
                name: "vix_extreme",
                value: self.vix_extreme,
            });
        }
        if !self.yield_shock_bps.is_finite() || self.yield_shock_bps >= 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                name: "yield_shock_bps",
                value: self.yield_shock_bps,
            });
        }
        Ok(())
    }

    /// Yield-shock threshold expressed in percent, matching the snapshot's
    /// spread unit.
    pub fn yield_shock_pct(&self) -> f64 {
        self.yield_shock_bps / 100.0
    }
}

/// Pure, total, deterministic classifier: snapshot in, regime out.
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    config: ClassifierConfig,
}

impl RegimeClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a snapshot. Never fails: the guard list is exhaustive with
    /// `Neutral` as the default.
    pub fn classify(&self, snapshot: &IndicatorSnapshot) -> Regime {
        let rules = [
            (self.inflation_shock(snapshot), Regime::InflationShock),
            (self.deflation_recession(snapshot), Regime::DeflationRecession),
            (
                self.extreme_accumulation(snapshot),
                Regime::ExtremeAccumulation,
            ),
            (self.cautious_trend(snapshot), Regime::CautiousTrend),
            (self.cautious_vol(snapshot), Regime::CautiousVol),
        ];

        rules
            .into_iter()
            .find_map(|(fired, regime)| fired.then_some(regime))
            .unwrap_or(Regime::Neutral)
    }

    /// Curve at or beyond the shock threshold.
    pub fn inflation_shock(&self, snapshot: &IndicatorSnapshot) -> bool {
        snapshot.yield_spread <= self.config.yield_shock_pct()
    }

    /// Sahm Rule: unemployment at or above its rolling minimum plus margin.
    pub fn deflation_recession(&self, snapshot: &IndicatorSnapshot) -> bool {
        snapshot.sahm_delta() >= self.config.sahm_margin
    }

    /// Capitulation: extreme volatility after a sharp decline. Contrarian buy.
    pub fn extreme_accumulation(&self, snapshot: &IndicatorSnapshot) -> bool {
        snapshot.vix >= self.config.vix_extreme && snapshot.sharp_decline
    }

    /// Broad index below its long-term trend line.
    pub fn cautious_trend(&self, snapshot: &IndicatorSnapshot) -> bool {
        snapshot.trend_broken
    }

    /// Volatility elevated without a trend break.
    pub fn cautious_vol(&self, snapshot: &IndicatorSnapshot) -> bool {
        snapshot.vix >= self.config.vix_elevated
    }
}
