use crate::equity::EquityCurve;
use crate::error::AnalyticsError;
use crate::stats;
use configuration::AnalysisConfig;

/// Trailing-window statistics, one entry per trade position.
///
/// Positions before the first full window are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingMetrics {
    pub window: usize,
    /// Sample standard deviation of the returns in the window.
    pub volatility: Vec<Option<f64>>,
    /// Annualized Sharpe ratio of the returns in the window.
    pub sharpe: Vec<Option<f64>>,
    /// Deepest drawdown reached within the window.
    pub min_drawdown: Vec<Option<f64>>,
}

impl RollingMetrics {
    pub fn compute(curve: &EquityCurve, config: &AnalysisConfig) -> Result<Self, AnalyticsError> {
        let window = config.rolling_window;
        if window == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "rolling window must be at least 1".to_string(),
            ));
        }

        let returns = curve.returns();
        let annualization = config.periods_per_year.sqrt();
        let risk_free = config.risk_free_rate / config.periods_per_year;

        Ok(Self {
            window,
            volatility: rolling(&returns, window, stats::sample_std),
            sharpe: rolling(&returns, window, |slice| {
                stats::sharpe_ratio(slice, risk_free).map(|s| s * annualization)
            }),
            min_drawdown: rolling(curve.drawdown(), window, |slice| {
                slice.iter().copied().reduce(f64::min)
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.volatility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volatility.is_empty()
    }
}

fn rolling<F>(values: &[f64], window: usize, statistic: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                statistic(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(window: usize) -> AnalysisConfig {
        AnalysisConfig {
            rolling_window: window,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn leading_positions_are_missing() {
        let factors: Vec<f64> = (0..40).map(|i| 1.0 + 0.01 * ((i % 7) as f64 - 3.0)).collect();
        let curve = EquityCurve::from_factors(&factors).unwrap();
        let metrics = RollingMetrics::compute(&curve, &config(30)).unwrap();

        assert_eq!(metrics.len(), 40);
        for i in 0..29 {
            assert_eq!(metrics.volatility[i], None);
            assert_eq!(metrics.sharpe[i], None);
            assert_eq!(metrics.min_drawdown[i], None);
        }
        assert!(metrics.volatility[29].is_some());
        assert!(metrics.min_drawdown[39].is_some());
    }

    #[test]
    fn series_shorter_than_window_is_all_missing() {
        let curve = EquityCurve::from_factors(&[1.01, 0.99, 1.02]).unwrap();
        let metrics = RollingMetrics::compute(&curve, &config(30)).unwrap();
        assert!(metrics.volatility.iter().all(Option::is_none));
    }

    #[test]
    fn flat_window_has_no_sharpe() {
        let curve = EquityCurve::from_factors(&[1.01; 5]).unwrap();
        let metrics = RollingMetrics::compute(&curve, &config(3)).unwrap();
        assert_eq!(metrics.sharpe[4], None);
        assert_eq!(metrics.min_drawdown[4], Some(0.0));
    }

    #[test]
    fn zero_window_is_rejected() {
        let curve = EquityCurve::from_factors(&[1.01]).unwrap();
        assert!(RollingMetrics::compute(&curve, &config(0)).is_err());
    }

    proptest! {
        #[test]
        fn matches_direct_recomputation(
            factors in prop::collection::vec(0.8f64..1.2, 1..120),
            window in 1usize..40,
        ) {
            let analysis = config(window);
            let curve = EquityCurve::from_factors(&factors).unwrap();
            let metrics = RollingMetrics::compute(&curve, &analysis).unwrap();
            let returns = curve.returns();
            let annualization = analysis.periods_per_year.sqrt();

            for i in 0..factors.len() {
                if i + 1 < window {
                    prop_assert!(metrics.volatility[i].is_none());
                    prop_assert!(metrics.sharpe[i].is_none());
                    prop_assert!(metrics.min_drawdown[i].is_none());
                    continue;
                }
                let slice = &returns[i + 1 - window..=i];
                let drawdowns = &curve.drawdown()[i + 1 - window..=i];

                prop_assert_eq!(metrics.volatility[i], stats::sample_std(slice));
                prop_assert_eq!(
                    metrics.sharpe[i],
                    stats::sharpe_ratio(slice, 0.0).map(|s| s * annualization)
                );
                let expected_min = drawdowns.iter().copied().fold(f64::INFINITY, f64::min);
                prop_assert_eq!(metrics.min_drawdown[i], Some(expected_min));
            }
        }
    }
}
