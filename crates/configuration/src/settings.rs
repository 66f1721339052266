use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for a report run.
///
/// Every section has defaults, so an empty or missing `config.toml` still
/// describes a complete run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub analysis: AnalysisConfig,
    pub monte_carlo: MonteCarloConfig,
    pub benchmarks: Vec<BenchmarkConfig>,
    pub output: OutputConfig,
}

/// Where the trade records live and how the file is laid out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the delimited trade file.
    pub path: PathBuf,
    /// Field delimiter, e.g. ',' or ';'.
    pub delimiter: char,
    /// chrono format string for the trade date column (day/month/year).
    pub date_format: String,
}

/// Parameters shared by the KPI, rolling and benchmark calculations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First day of the analysis window. Defaults to the first trade date.
    pub start_date: Option<NaiveDate>,
    /// Last day of the analysis window. Defaults to the last trade date.
    pub end_date: Option<NaiveDate>,
    /// Trailing window length for the rolling metrics.
    pub rolling_window: usize,
    /// Periods per year used for annualization. Trades are treated as daily
    /// observations regardless of their actual spacing.
    pub periods_per_year: f64,
    /// Annual risk-free rate as a fraction.
    pub risk_free_rate: f64,
    /// Horizon used as the CAGR exponent. Fixed at one year rather than the
    /// span between the first and last trade.
    pub cagr_horizon_years: f64,
    /// Confidence level for historical VaR / CVaR (e.g. 0.95).
    pub var_confidence: f64,
}

/// Parameters for the resampling stress test.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of simulated paths.
    pub simulations: usize,
    /// Seed for reproducibility (None = seeded from OS entropy).
    pub seed: Option<u64>,
}

/// The market-data provider a benchmark is pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkSource {
    Binance,
    Yahoo,
}

/// One reference instrument to compare the strategy against.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    /// Display name used in the benchmark table (e.g. "BTC").
    pub name: String,
    /// Provider symbol (e.g. "BTCUSDT" or "^GSPC").
    pub symbol: String,
    pub source: BenchmarkSource,
    /// Whether this benchmark's daily equity curve is exported alongside the
    /// strategy curve.
    #[serde(default)]
    pub export_curve: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the CSV tables and the run log.
    pub dir: PathBuf,
}

// --- Default Implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            analysis: AnalysisConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
            benchmarks: default_benchmarks(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/trades.csv"),
            delimiter: ',',
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            rolling_window: 30,
            periods_per_year: 365.0,
            risk_free_rate: 0.0,
            cagr_horizon_years: 1.0,
            var_confidence: 0.95,
        }
    }
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            simulations: 5000,
            seed: Some(42),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

fn default_benchmarks() -> Vec<BenchmarkConfig> {
    vec![
        BenchmarkConfig {
            name: "BTC".to_string(),
            symbol: "BTCUSDT".to_string(),
            source: BenchmarkSource::Binance,
            export_curve: true,
        },
        BenchmarkConfig {
            name: "S&P 500".to_string(),
            symbol: "^GSPC".to_string(),
            source: BenchmarkSource::Yahoo,
            export_curve: false,
        },
        BenchmarkConfig {
            name: "NASDAQ Composite".to_string(),
            symbol: "^IXIC".to_string(),
            source: BenchmarkSource::Yahoo,
            export_curve: false,
        },
    ]
}

impl AnalysisConfig {
    /// Resolves the analysis window, falling back to the trade span for any
    /// bound that is not configured.
    pub fn window(&self, first_trade: NaiveDate, last_trade: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            self.start_date.unwrap_or(first_trade),
            self.end_date.unwrap_or(last_trade),
        )
    }
}

impl Config {
    /// The benchmark whose equity curve is exported next to the strategy's.
    pub fn curve_benchmark(&self) -> Option<&BenchmarkConfig> {
        self.benchmarks.iter().find(|b| b.export_curve)
    }

    /// Rejects parameter combinations the calculations cannot work with.
    /// The error names the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;
        if analysis.rolling_window == 0 {
            return Err(ConfigError::invalid("analysis.rolling_window", "must be at least 1"));
        }
        if !(analysis.periods_per_year > 0.0) {
            return Err(ConfigError::invalid("analysis.periods_per_year", "must be positive"));
        }
        if !(analysis.cagr_horizon_years > 0.0) {
            return Err(ConfigError::invalid("analysis.cagr_horizon_years", "must be positive"));
        }
        if !(analysis.var_confidence > 0.0 && analysis.var_confidence < 1.0) {
            return Err(ConfigError::invalid(
                "analysis.var_confidence",
                "must be strictly between 0 and 1",
            ));
        }
        if let (Some(start), Some(end)) = (analysis.start_date, analysis.end_date) {
            if start > end {
                return Err(ConfigError::invalid(
                    "analysis.start_date",
                    format!("{} is after end_date {}", start, end),
                ));
            }
        }
        if self.monte_carlo.simulations == 0 {
            return Err(ConfigError::invalid("monte_carlo.simulations", "must be at least 1"));
        }
        match self.benchmarks.iter().filter(|b| b.export_curve).count() {
            0 if !self.benchmarks.is_empty() => {
                return Err(ConfigError::invalid(
                    "benchmarks.export_curve",
                    "one benchmark must set export_curve = true",
                ));
            }
            n if n > 1 => {
                return Err(ConfigError::invalid(
                    "benchmarks.export_curve",
                    format!("{} benchmarks set export_curve = true, only one may", n),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}
