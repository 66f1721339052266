use crate::equity::EquityCurve;
use crate::error::AnalyticsError;
use crate::report::KpiReport;
use crate::stats;
use chrono::NaiveDate;
use configuration::AnalysisConfig;
use core_types::{EquityPoint, PricePoint};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Keeps the prices inside `[start, end]` that carry a usable close, one per
/// date in ascending order. Later duplicates of a date replace earlier ones.
/// Missing dates stay missing.
pub fn align_prices(prices: &[PricePoint], start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, f64)> {
    let mut aligned = BTreeMap::new();
    let mut dropped = 0usize;

    for point in prices.iter().filter(|p| p.date >= start && p.date <= end) {
        match point.close.to_f64() {
            Some(close) if close.is_finite() && close > 0.0 => {
                aligned.insert(point.date, close);
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(dropped, "Dropped benchmark prices without a usable close.");
    }
    aligned.into_iter().collect()
}

/// A benchmark's aligned daily returns and the equity compounded from them.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSeries {
    pub name: String,
    /// One date per aligned price.
    pub dates: Vec<NaiveDate>,
    /// Daily simple returns, one fewer than `dates` (empty below two prices).
    pub returns: Vec<f64>,
    /// Starts at 1.0 and has one point per date. With no aligned price it is
    /// the single base point.
    pub curve: EquityCurve,
}

impl BenchmarkSeries {
    /// Builds the series from aligned `(date, close)` pairs.
    ///
    /// The first date has no return; equity is exactly 1.0 there and every
    /// later date compounds that day's return. Fewer than two prices leave
    /// the returns empty, so every return-based statistic is undefined.
    pub fn from_prices(name: &str, prices: &[(NaiveDate, f64)]) -> Result<Self, AnalyticsError> {
        if prices.len() < 2 {
            warn!(
                benchmark = name,
                prices = prices.len(),
                "Too few aligned prices for benchmark returns."
            );
        }

        let returns: Vec<f64> = prices.windows(2).map(|w| w[1].1 / w[0].1 - 1.0).collect();
        let factors: Vec<f64> = std::iter::once(1.0)
            .chain(returns.iter().map(|r| 1.0 + r))
            .collect();

        Ok(Self {
            name: name.to_string(),
            dates: prices.iter().map(|(date, _)| *date).collect(),
            returns,
            curve: EquityCurve::from_factors(&factors)?,
        })
    }

    pub fn equity_points(&self) -> Vec<EquityPoint> {
        self.dates
            .iter()
            .zip(self.curve.equity())
            .map(|(date, equity)| EquityPoint {
                date: *date,
                equity: *equity,
            })
            .collect()
    }
}

/// One row of the side-by-side comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub name: String,
    pub total_return: f64,
    pub cagr: Option<f64>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub calmar_ratio: Option<f64>,
}

impl BenchmarkReport {
    /// Computes the benchmark's KPIs from its own daily returns, with the
    /// same annualization as the strategy.
    pub fn from_series(series: &BenchmarkSeries, config: &AnalysisConfig) -> Self {
        let annualization = config.periods_per_year.sqrt();
        let risk_free = config.risk_free_rate / config.periods_per_year;
        let cagr = stats::cagr(series.curve.final_equity(), config.cagr_horizon_years);
        let max_drawdown = series.curve.max_drawdown();

        Self {
            name: series.name.clone(),
            total_return: series.curve.total_return(),
            cagr,
            annualized_return: stats::mean(&series.returns).map(|m| m * config.periods_per_year),
            annualized_volatility: stats::sample_std(&series.returns).map(|s| s * annualization),
            sharpe_ratio: stats::sharpe_ratio(&series.returns, risk_free).map(|s| s * annualization),
            sortino_ratio: stats::sortino_ratio(&series.returns, risk_free)
                .map(|s| s * annualization),
            max_drawdown,
            calmar_ratio: stats::calmar_ratio(cagr, max_drawdown),
        }
    }

    /// The strategy's row of the comparison table.
    pub fn from_strategy(name: &str, kpis: &KpiReport) -> Self {
        Self {
            name: name.to_string(),
            total_return: kpis.total_return,
            cagr: kpis.cagr,
            annualized_return: Some(kpis.annualized_return),
            annualized_volatility: kpis.annualized_volatility,
            sharpe_ratio: kpis.sharpe_annualized,
            sortino_ratio: kpis.sortino_annualized,
            max_drawdown: kpis.max_drawdown,
            calmar_ratio: kpis.calmar_ratio,
        }
    }
}
