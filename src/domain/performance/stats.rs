use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

/// Shared statistics utilities for value-series analysis.
pub struct Stats;

impl Stats {
    /// Period-over-period returns of a value series.
    pub fn period_returns(values: &[Decimal]) -> Vec<Decimal> {
        values
            .windows(2)
            .filter(|pair| pair[0] > Decimal::ZERO)
            .map(|pair| pair[1] / pair[0] - Decimal::ONE)
            .collect()
    }

    /// Sharpe Ratio over daily returns.
    ///
    /// annualize: if true, multiplies by sqrt(252)
    pub fn sharpe_ratio(returns: &[Decimal], annualize: bool) -> Decimal {
        if returns.len() < 2 {
            return Decimal::ZERO;
        }

        let n = Decimal::from(returns.len());
        let sum: Decimal = returns.iter().sum();
        let mean_return = sum / n;

        // Sample variance (n-1)
        let mut variance_sum = Decimal::ZERO;
        for r in returns {
            let diff = r - mean_return;
            variance_sum += diff * diff;
        }

        let n_minus_1 = Decimal::from(returns.len() - 1);
        let variance = variance_sum / n_minus_1;

        let std_dev_f64 = variance.to_f64().unwrap_or(0.0).sqrt();
        let std_dev = Decimal::from_f64_retain(std_dev_f64).unwrap_or(Decimal::ZERO);

        if std_dev > dec!(1e-9) {
            let ratio = mean_return / std_dev;
            if annualize {
                let sqrt_252 =
                    Decimal::from_f64_retain(15.874507866387544).unwrap_or(Decimal::ZERO);
                ratio * sqrt_252
            } else {
                ratio
            }
        } else {
            Decimal::ZERO
        }
    }

    /// Deepest peak-to-valley decline, in percent. Zero or negative.
    pub fn max_drawdown_pct(values: &[Decimal]) -> Decimal {
        let mut peak = Decimal::ZERO;
        let mut max_dd = Decimal::ZERO;

        for value in values {
            if *value > peak {
                peak = *value;
            }
            if peak > Decimal::ZERO {
                let dd = (value / peak - Decimal::ONE) * dec!(100);
                if dd < max_dd {
                    max_dd = dd;
                }
            }
        }

        max_dd
    }

    /// Annualized volatility of daily returns, in percent.
    pub fn annualized_volatility_pct(returns: &[Decimal]) -> f64 {
        if returns.len() < 2 {
            return 0.0;
        }

        let rets: Vec<f64> = returns.iter().filter_map(|r| r.to_f64()).collect();
        let n = rets.len() as f64;
        let mean = rets.iter().sum::<f64>() / n;
        let variance = rets.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

        variance.sqrt() * 252f64.sqrt() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_returns() {
        let values = vec![dec!(100), dec!(110), dec!(99)];
        let returns = Stats::period_returns(&values);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0], dec!(0.1));
        assert_eq!(returns[1], dec!(-0.1));
    }

    #[test]
    fn test_sharpe_of_constant_returns_is_zero() {
        let returns = vec![dec!(0.01); 10];
        assert_eq!(Stats::sharpe_ratio(&returns, true), Decimal::ZERO);
    }

    #[test]
    fn test_sharpe_sign_follows_mean_return() {
        let gains = vec![dec!(0.01), dec!(0.02), dec!(0.015), dec!(0.005)];
        assert!(Stats::sharpe_ratio(&gains, false) > Decimal::ZERO);

        let losses = vec![dec!(-0.01), dec!(-0.02), dec!(-0.015), dec!(-0.005)];
        assert!(Stats::sharpe_ratio(&losses, false) < Decimal::ZERO);
    }

    #[test]
    fn test_max_drawdown_of_known_series() {
        // Peak 120, trough 90: -25%.
        let values = vec![dec!(100), dec!(120), dec!(90), dec!(110)];
        assert_eq!(Stats::max_drawdown_pct(&values), dec!(-25));
    }

    #[test]
    fn test_monotonic_series_has_zero_drawdown() {
        let values = vec![dec!(100), dec!(105), dec!(111)];
        assert_eq!(Stats::max_drawdown_pct(&values), Decimal::ZERO);
    }

    #[test]
    fn test_volatility_is_zero_for_constant_returns() {
        let returns = vec![dec!(0.01); 5];
        assert!(Stats::annualized_volatility_pct(&returns) < 1e-12);
    }
}
