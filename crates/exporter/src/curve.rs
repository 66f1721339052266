use analytics::EquityCurve;
use chrono::NaiveDate;
use core_types::{EquityPoint, TradeRecord};

/// Pairs each trade's date with the equity after that trade.
pub fn strategy_points(trades: &[TradeRecord], curve: &EquityCurve) -> Vec<EquityPoint> {
    trades
        .iter()
        .zip(curve.equity())
        .map(|(trade, equity)| EquityPoint {
            date: trade.date,
            equity: *equity,
        })
        .collect()
}

/// Expands a date-ordered curve to one point per calendar day in
/// `[start, end]`.
///
/// Each day carries the last value dated on or before it. When several
/// points share a date the last one wins. Days before the first point start
/// from the base equity of 1.0.
pub fn forward_fill_daily(points: &[EquityPoint], start: NaiveDate, end: NaiveDate) -> Vec<EquityPoint> {
    let mut filled = Vec::new();
    let mut current = 1.0;
    let mut next = 0;

    for date in start.iter_days().take_while(|d| *d <= end) {
        while next < points.len() && points[next].date <= date {
            current = points[next].equity;
            next += 1;
        }
        filled.push(EquityPoint {
            date,
            equity: current,
        });
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn point(d: u32, equity: f64) -> EquityPoint {
        EquityPoint {
            date: day(d),
            equity,
        }
    }

    #[test]
    fn fills_gaps_with_the_last_value() {
        let points = vec![point(2, 1.02), point(5, 0.97)];
        let filled = forward_fill_daily(&points, day(1), day(6));

        let equity: Vec<f64> = filled.iter().map(|p| p.equity).collect();
        assert_eq!(equity, vec![1.0, 1.02, 1.02, 1.02, 0.97, 0.97]);
        assert_eq!(filled.first().unwrap().date, day(1));
        assert_eq!(filled.last().unwrap().date, day(6));
    }

    #[test]
    fn last_point_of_a_day_wins() {
        let points = vec![point(1, 1.01), point(1, 1.03), point(2, 1.05)];
        let filled = forward_fill_daily(&points, day(1), day(2));
        assert_eq!(filled[0].equity, 1.03);
        assert_eq!(filled[1].equity, 1.05);
    }

    #[test]
    fn points_before_the_window_seed_the_first_day() {
        let points = vec![point(1, 1.10), point(4, 1.20)];
        let filled = forward_fill_daily(&points, day(3), day(4));
        assert_eq!(filled[0].equity, 1.10);
        assert_eq!(filled[1].equity, 1.20);
    }

    #[test]
    fn inverted_window_is_empty() {
        assert!(forward_fill_daily(&[point(1, 1.0)], day(5), day(4)).is_empty());
    }
}
