use crate::error::AnalyticsError;
use core_types::TradeRecord;

/// Compounded equity, high-water mark and drawdown, aligned by position.
///
/// Built from a sequence of multiplicative growth factors starting from a
/// unit investment. Factors are not validated: a non-positive factor simply
/// produces the path it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityCurve {
    factors: Vec<f64>,
    equity: Vec<f64>,
    high_water_mark: Vec<f64>,
    drawdown: Vec<f64>,
}

impl EquityCurve {
    pub fn from_factors(factors: &[f64]) -> Result<Self, AnalyticsError> {
        if factors.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "an equity curve needs at least one growth factor".to_string(),
            ));
        }

        let mut equity = Vec::with_capacity(factors.len());
        let mut high_water_mark = Vec::with_capacity(factors.len());
        let mut drawdown = Vec::with_capacity(factors.len());

        let mut value = 1.0;
        let mut peak = f64::NEG_INFINITY;
        for &factor in factors {
            value *= factor;
            if value > peak {
                peak = value;
            }
            equity.push(value);
            high_water_mark.push(peak);
            drawdown.push(if peak == 0.0 { 0.0 } else { (value - peak) / peak });
        }

        Ok(Self {
            factors: factors.to_vec(),
            equity,
            high_water_mark,
            drawdown,
        })
    }

    /// Builds the curve from trades already in date order.
    pub fn from_trades(trades: &[TradeRecord]) -> Result<Self, AnalyticsError> {
        let factors: Vec<f64> = trades.iter().map(TradeRecord::factor).collect();
        Self::from_factors(&factors)
    }

    pub fn len(&self) -> usize {
        self.equity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equity.is_empty()
    }

    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    pub fn equity(&self) -> &[f64] {
        &self.equity
    }

    pub fn high_water_mark(&self) -> &[f64] {
        &self.high_water_mark
    }

    pub fn drawdown(&self) -> &[f64] {
        &self.drawdown
    }

    /// Per-step simple returns (`factor - 1`).
    pub fn returns(&self) -> Vec<f64> {
        self.factors.iter().map(|f| f - 1.0).collect()
    }

    pub fn final_equity(&self) -> f64 {
        self.equity[self.equity.len() - 1]
    }

    pub fn total_return(&self) -> f64 {
        self.final_equity() - 1.0
    }

    /// The deepest drawdown, as a non-positive fraction.
    pub fn max_drawdown(&self) -> f64 {
        self.drawdown.iter().copied().fold(0.0, f64::min)
    }

    /// Root-mean-square of the drawdown magnitudes over every point.
    pub fn ulcer_index(&self) -> f64 {
        let sum_sq: f64 = self.drawdown.iter().map(|d| d * d).sum();
        (sum_sq / self.drawdown.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn three_trade_example() {
        let curve = EquityCurve::from_factors(&[1.02, 0.95, 1.10]).unwrap();

        assert_all_close(curve.equity(), &[1.02, 0.969, 1.0659]);
        assert_all_close(curve.high_water_mark(), &[1.02, 1.02, 1.0659]);
        assert_all_close(curve.drawdown(), &[0.0, -0.05, 0.0]);
        assert!((curve.total_return() - 0.0659).abs() < 1e-12);
        assert!((curve.max_drawdown() + 0.05).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            EquityCurve::from_factors(&[]),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }

    #[test]
    fn returns_are_factor_minus_one() {
        let curve = EquityCurve::from_factors(&[1.5, 0.5]).unwrap();
        assert_all_close(&curve.returns(), &[0.5, -0.5]);
    }

    #[test]
    fn ulcer_index_is_rms_of_drawdowns() {
        let curve = EquityCurve::from_factors(&[1.0, 0.9, 1.0]).unwrap();
        // drawdowns: 0, -0.1, -0.1 (peak stays at 1.0)
        let expected = ((0.01 + 0.01) / 3.0f64).sqrt();
        assert!((curve.drawdown()[2] + 0.1).abs() < 1e-12);
        assert!((curve.ulcer_index() - expected).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn curve_invariants(factors in prop::collection::vec(0.5f64..1.5, 1..200)) {
            let curve = EquityCurve::from_factors(&factors).unwrap();
            prop_assert_eq!(curve.len(), factors.len());

            let mut running = 1.0;
            let mut running_max = f64::NEG_INFINITY;
            for (i, factor) in factors.iter().enumerate() {
                running *= factor;
                running_max = running_max.max(running);

                prop_assert_eq!(curve.equity()[i], running);
                prop_assert_eq!(curve.high_water_mark()[i], running_max);
                prop_assert!(curve.drawdown()[i] <= 0.0);
                prop_assert!(curve.drawdown()[i] > -1.0);
                prop_assert_eq!(
                    curve.drawdown()[i] == 0.0,
                    curve.equity()[i] == curve.high_water_mark()[i]
                );
                if i > 0 {
                    prop_assert!(curve.high_water_mark()[i] >= curve.high_water_mark()[i - 1]);
                }
            }
        }
    }
}
