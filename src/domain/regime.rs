//! Macro regime enumeration.
//!
//! Six mutually exclusive, exhaustive regimes with `Neutral` as the default
//! fallback. `Display`/serde emit the canonical UPPER_SNAKE label
//! (`INFLATION_SHOCK`, …), and `FromStr` parses those labels
//! case-insensitively so configuration files may use any casing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The prevailing macroeconomic regime classified from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Acute curve/inflation stress: yield spread at or beyond the shock threshold.
    InflationShock,
    /// Sahm-rule recession signal: unemployment rising off its rolling minimum.
    DeflationRecession,
    /// Capitulation contrarian buy: extreme volatility after a sharp decline.
    ExtremeAccumulation,
    /// Broad index below its long-term trend line.
    CautiousTrend,
    /// Elevated volatility without a trend break.
    CautiousVol,
    /// Default/fallback when no stress guard fires.
    Neutral,
}

impl Regime {
    /// Every regime, in decision-tree precedence order.
    pub const ALL: [Regime; 6] = [
        Regime::InflationShock,
        Regime::DeflationRecession,
        Regime::ExtremeAccumulation,
        Regime::CautiousTrend,
        Regime::CautiousVol,
        Regime::Neutral,
    ];

    /// Canonical UPPER_SNAKE label, matching `Display` and the serde encoding.
    pub fn label(&self) -> &'static str {
        match self {
            Regime::InflationShock => "INFLATION_SHOCK",
            Regime::DeflationRecession => "DEFLATION_RECESSION",
            Regime::ExtremeAccumulation => "EXTREME_ACCUMULATION",
            Regime::CautiousTrend => "CAUTIOUS_TREND",
            Regime::CautiousVol => "CAUTIOUS_VOL",
            Regime::Neutral => "NEUTRAL",
        }
    }

    /// Human-readable description of the regime's market interpretation.
    pub fn description(&self) -> &'static str {
        match self {
            Regime::InflationShock => {
                "Curve/inflation stress — yield spread at or beyond the shock threshold"
            }
            Regime::DeflationRecession => {
                "Recession signal — unemployment rising off its rolling minimum (Sahm rule)"
            }
            Regime::ExtremeAccumulation => {
                "Capitulation — extreme volatility after a sharp decline; contrarian buy"
            }
            Regime::CautiousTrend => "Trend break — broad index below its long-term trend line",
            Regime::CautiousVol => "Elevated volatility without a trend break",
            Regime::Neutral => "Calm conditions — no stress guard fired",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Regime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Regime::ALL
            .into_iter()
            .find(|r| r.label() == normalized)
            .ok_or_else(|| anyhow::anyhow!("unknown regime label: {s}"))
    }
}
