use crate::monte_carlo::MonteCarloResult;
use serde::Serialize;

/// The standardized set of strategy statistics.
///
/// This struct is the final output of the `AnalyticsEngine` and is exported
/// as a single table row. `None` marks a statistic that is undefined for the
/// data at hand (e.g. a profit factor without losing trades).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    // I. Trade-Level Statistics (risk-adjusted returns)
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub payoff_ratio: Option<f64>,
    pub profit_factor: Option<f64>, // None when there are no losing trades
    pub expectancy: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_stop_loss_pct: f64,

    // II. Returns
    pub total_return: f64,
    pub cagr: Option<f64>,
    pub mean_return: f64,
    pub annualized_return: f64,

    // III. Risk and Drawdown
    pub volatility: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub max_drawdown: f64,
    pub ulcer_index: f64,
    pub var: Option<f64>,
    pub cvar: Option<f64>,

    // IV. Risk-Adjusted Ratios
    pub sharpe_daily: Option<f64>,
    pub sharpe_annualized: Option<f64>,
    pub sortino_daily: Option<f64>,
    pub sortino_annualized: Option<f64>,
    pub calmar_ratio: Option<f64>,
    pub ulcer_performance_index: Option<f64>,

    // V. Distribution Shape
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub autocorrelation_lag1: Option<f64>,

    // VI. Monte Carlo Stress Test
    pub mc_p1: Option<f64>,
    pub mc_p5: Option<f64>,
    pub mc_median: Option<f64>,
    pub mc_mean: Option<f64>,
    pub mc_prob_loss: Option<f64>,
}

impl KpiReport {
    /// Creates a new, zeroed-out report.
    /// This is the starting point the engine fills in.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            payoff_ratio: None,
            profit_factor: None,
            expectancy: 0.0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            avg_stop_loss_pct: 0.0,
            total_return: 0.0,
            cagr: None,
            mean_return: 0.0,
            annualized_return: 0.0,
            volatility: None,
            annualized_volatility: None,
            max_drawdown: 0.0,
            ulcer_index: 0.0,
            var: None,
            cvar: None,
            sharpe_daily: None,
            sharpe_annualized: None,
            sortino_daily: None,
            sortino_annualized: None,
            calmar_ratio: None,
            ulcer_performance_index: None,
            skewness: None,
            kurtosis: None,
            autocorrelation_lag1: None,
            mc_p1: None,
            mc_p5: None,
            mc_median: None,
            mc_mean: None,
            mc_prob_loss: None,
        }
    }

    /// Copies the stress-test quantiles into the report.
    pub fn with_monte_carlo(mut self, result: &MonteCarloResult) -> Self {
        self.mc_p1 = Some(result.p1);
        self.mc_p5 = Some(result.p5);
        self.mc_median = Some(result.median);
        self.mc_mean = Some(result.mean);
        self.mc_prob_loss = Some(result.prob_loss);
        self
    }
}

impl Default for KpiReport {
    fn default() -> Self {
        Self::new()
    }
}
