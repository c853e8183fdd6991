use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building classifier thresholds or allocation baskets
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("allocation for {regime} sums to {sum:.6}, expected 1.0")]
    WeightSum { regime: String, sum: f64 },

    #[error("allocation for {regime} is empty")]
    EmptyBasket { regime: String },

    #[error("negative weight {weight} for {ticker} in {regime}")]
    NegativeWeight {
        regime: String,
        ticker: String,
        weight: f64,
    },

    #[error("invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid window {name}: {value}")]
    InvalidWindow { name: &'static str, value: usize },

    #[error("unknown regime label in basket configuration: {label}")]
    UnknownRegime { label: String },

    #[error("no basket configured for {regime}")]
    MissingBasket { regime: String },
}

/// Errors raised by the backtest engine and snapshot pipeline
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("snapshot dates must be strictly increasing: {prev} followed by {next}")]
    DataOrder { prev: NaiveDate, next: NaiveDate },

    #[error("cannot run a backtest on an empty snapshot sequence")]
    InsufficientData,

    #[error("no price history for {ticker}, required by {required_by}")]
    MissingInstrumentData { ticker: String, required_by: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_sum_formatting() {
        let err = ConfigurationError::WeightSum {
            regime: "NEUTRAL".to_string(),
            sum: 0.95,
        };

        let msg = err.to_string();
        assert!(msg.contains("NEUTRAL"));
        assert!(msg.contains("0.950000"));
    }

    #[test]
    fn test_data_order_formatting() {
        let err = BacktestError::DataOrder {
            prev: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            next: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        };

        let msg = err.to_string();
        assert!(msg.contains("2024-03-05"));
        assert!(msg.contains("2024-03-04"));
    }

    #[test]
    fn test_missing_instrument_formatting() {
        let err = BacktestError::MissingInstrumentData {
            ticker: "GLD".to_string(),
            required_by: "the DEFLATION_RECESSION allocation".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("GLD"));
        assert!(msg.contains("DEFLATION_RECESSION"));
    }
}
