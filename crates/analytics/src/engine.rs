use crate::equity::EquityCurve;
use crate::error::AnalyticsError;
use crate::report::KpiReport;
use crate::rolling::RollingMetrics;
use crate::stats;
use configuration::AnalysisConfig;
use core_types::TradeRecord;
use tracing::debug;

/// A stateless calculator for deriving performance metrics from trade records.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalysisConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - All trades in date order.
    /// * `curve` - The equity curve built from the same trades.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `KpiReport` or an `AnalyticsError`. The Monte
    /// Carlo fields are left empty; see `KpiReport::with_monte_carlo`.
    pub fn calculate(
        &self,
        trades: &[TradeRecord],
        curve: &EquityCurve,
    ) -> Result<KpiReport, AnalyticsError> {
        if trades.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "no trades to analyze".to_string(),
            ));
        }
        if trades.len() != curve.len() {
            return Err(AnalyticsError::Calculation(format!(
                "equity curve has {} points for {} trades",
                curve.len(),
                trades.len()
            )));
        }

        let mut report = KpiReport::new();
        let returns = curve.returns();

        self.calculate_trade_statistics(trades, &mut report)?;
        self.calculate_returns(curve, &returns, &mut report)?;
        self.calculate_drawdown(curve, &mut report)?;
        self.calculate_ratios(&returns, &mut report)?;
        self.calculate_distribution(&returns, &mut report)?;

        debug!(?report, "KPI calculation complete.");
        Ok(report)
    }

    /// Rolling statistics over the configured trailing window.
    pub fn rolling(&self, curve: &EquityCurve) -> Result<RollingMetrics, AnalyticsError> {
        RollingMetrics::compute(curve, &self.config)
    }

    /// Win/loss statistics over the risk-adjusted trade returns.
    fn calculate_trade_statistics(
        &self,
        trades: &[TradeRecord],
        report: &mut KpiReport,
    ) -> Result<(), AnalyticsError> {
        report.total_trades = trades.len();

        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut win_streak = 0;
        let mut loss_streak = 0;

        for trade in trades {
            let r = trade.risk_adjusted_return();
            if !r.is_finite() {
                return Err(AnalyticsError::Calculation(format!(
                    "trade {} has a non-finite risk-adjusted return",
                    trade.id
                )));
            }

            if r > 0.0 {
                gross_profit += r;
                report.winning_trades += 1;
                win_streak += 1;
                loss_streak = 0;
            } else if r < 0.0 {
                gross_loss += r;
                report.losing_trades += 1;
                loss_streak += 1;
                win_streak = 0;
            } else {
                win_streak = 0;
                loss_streak = 0;
            }
            report.max_consecutive_wins = report.max_consecutive_wins.max(win_streak);
            report.max_consecutive_losses = report.max_consecutive_losses.max(loss_streak);
        }

        // --- Ratios ---
        report.win_rate = report.winning_trades as f64 / report.total_trades as f64;

        if report.winning_trades > 0 {
            report.avg_win = gross_profit / report.winning_trades as f64;
        }
        if report.losing_trades > 0 {
            report.avg_loss = gross_loss / report.losing_trades as f64;
            report.payoff_ratio = Some(report.avg_win / report.avg_loss.abs());
            report.profit_factor = Some(gross_profit / gross_loss.abs());
        }

        report.expectancy =
            report.win_rate * report.avg_win + (1.0 - report.win_rate) * report.avg_loss;

        let stop_losses: Vec<f64> = trades.iter().map(TradeRecord::stop_loss).collect();
        report.avg_stop_loss_pct = stats::mean(&stop_losses).unwrap_or_default();

        Ok(())
    }

    /// Return statistics over the per-trade equity returns.
    fn calculate_returns(
        &self,
        curve: &EquityCurve,
        returns: &[f64],
        report: &mut KpiReport,
    ) -> Result<(), AnalyticsError> {
        report.total_return = curve.total_return();
        // The horizon is a fixed configuration value, not the elapsed time
        // between the first and last trade.
        report.cagr = stats::cagr(curve.final_equity(), self.config.cagr_horizon_years);

        report.mean_return = stats::mean(returns).unwrap_or_default();
        report.annualized_return = report.mean_return * self.config.periods_per_year;

        report.volatility = stats::sample_std(returns);
        report.annualized_volatility = report
            .volatility
            .map(|v| v * self.config.periods_per_year.sqrt());

        Ok(())
    }

    fn calculate_drawdown(
        &self,
        curve: &EquityCurve,
        report: &mut KpiReport,
    ) -> Result<(), AnalyticsError> {
        report.max_drawdown = curve.max_drawdown();
        report.ulcer_index = curve.ulcer_index();
        Ok(())
    }

    /// Calculates all ratio-based metrics like Sharpe and Calmar.
    fn calculate_ratios(&self, returns: &[f64], report: &mut KpiReport) -> Result<(), AnalyticsError> {
        let annualization = self.config.periods_per_year.sqrt();
        let risk_free = self.config.risk_free_rate / self.config.periods_per_year;

        report.sharpe_daily = stats::sharpe_ratio(returns, risk_free);
        report.sharpe_annualized = report.sharpe_daily.map(|s| s * annualization);

        report.sortino_daily = stats::sortino_ratio(returns, risk_free);
        report.sortino_annualized = report.sortino_daily.map(|s| s * annualization);

        report.calmar_ratio = stats::calmar_ratio(report.cagr, report.max_drawdown);

        if report.ulcer_index > stats::ZERO_VARIANCE {
            report.ulcer_performance_index = Some(
                (report.annualized_return - self.config.risk_free_rate) / report.ulcer_index,
            );
        }

        Ok(())
    }

    fn calculate_distribution(
        &self,
        returns: &[f64],
        report: &mut KpiReport,
    ) -> Result<(), AnalyticsError> {
        report.skewness = stats::skewness(returns);
        report.kurtosis = stats::excess_kurtosis(returns);
        report.autocorrelation_lag1 = stats::autocorrelation(returns, 1);

        if let Some((var, cvar)) = stats::historical_var(returns, self.config.var_confidence) {
            report.var = Some(var);
            report.cvar = Some(cvar);
        }

        Ok(())
    }
}
