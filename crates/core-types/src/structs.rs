use crate::enums::TradeType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// One executed trade, as read from the input file.
///
/// Percentages are stored as written (e.g. `2.5` means 2.5%). The variation
/// index is the multiplicative growth factor applied to equity by this trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub id: String,
    pub trade_type: TradeType,
    pub stop_loss_pct: Decimal,
    pub date: NaiveDate,
    pub return_pct: Decimal,
    pub risk_adj_return_pct: Decimal,
    pub variation_index: Decimal,
}

impl TradeRecord {
    /// The variation index as a float growth factor.
    pub fn factor(&self) -> f64 {
        self.variation_index.to_f64().unwrap_or(f64::NAN)
    }

    /// The risk-adjusted return as a fraction (2.5% -> 0.025).
    pub fn risk_adjusted_return(&self) -> f64 {
        self.risk_adj_return_pct
            .to_f64()
            .map(|pct| pct / 100.0)
            .unwrap_or(f64::NAN)
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop_loss_pct.to_f64().unwrap_or(f64::NAN)
    }
}

/// A daily closing price returned by a market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// A dated equity value, the row shape of the exported equity curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record() -> TradeRecord {
        TradeRecord {
            id: "T1".to_string(),
            trade_type: TradeType::Long,
            stop_loss_pct: dec!(1.5),
            date: NaiveDate::from_ymd_opt(2023, 3, 14).unwrap(),
            return_pct: dec!(4.0),
            risk_adj_return_pct: dec!(2.5),
            variation_index: dec!(1.02),
        }
    }

    #[test]
    fn converts_to_float_units() {
        let trade = record();
        assert!((trade.factor() - 1.02).abs() < 1e-12);
        assert!((trade.risk_adjusted_return() - 0.025).abs() < 1e-12);
        assert!((trade.stop_loss() - 1.5).abs() < 1e-12);
    }
}
