use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, BenchmarkConfig, BenchmarkSource, Config, InputConfig, MonteCarloConfig,
    OutputConfig,
};

/// Loads the run configuration from a TOML file.
///
/// This function is the primary entry point for this crate. A missing file is
/// not an error: every key falls back to its default. The result is validated
/// before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No configuration file found, using defaults.");
    }

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.analysis.rolling_window, 30);
        assert_eq!(config.analysis.periods_per_year, 365.0);
        assert_eq!(config.monte_carlo.simulations, 5000);
        assert_eq!(config.monte_carlo.seed, Some(42));
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.curve_benchmark().unwrap().symbol, "BTCUSDT");
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [input]
            path = "trades.csv"
            delimiter = ";"

            [analysis]
            start_date = "2023-01-01"
            rolling_window = 10

            [monte_carlo]
            simulations = 100
            seed = 7

            [[benchmarks]]
            name = "ETH"
            symbol = "ETHUSDT"
            source = "binance"
            export_curve = true
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.input.delimiter, ';');
        assert_eq!(config.input.date_format, "%d/%m/%Y");
        assert_eq!(
            config.analysis.start_date,
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(config.analysis.end_date, None);
        assert_eq!(config.analysis.rolling_window, 10);
        assert_eq!(config.monte_carlo.seed, Some(7));
        assert_eq!(config.benchmarks.len(), 1);
        assert_eq!(config.benchmarks[0].source, BenchmarkSource::Binance);
    }

    #[test]
    fn rejects_zero_window() {
        let file = write_config("[analysis]\nrolling_window = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "analysis.rolling_window", .. }
        ));
    }

    #[test]
    fn rejects_inverted_window() {
        let mut config = Config::default();
        config.analysis.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        config.analysis.end_date = NaiveDate::from_ymd_opt(2023, 1, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key: "analysis.start_date", .. })
        ));
    }

    #[test]
    fn rejects_two_exported_benchmark_curves() {
        let mut config = Config::default();
        for benchmark in &mut config.benchmarks {
            benchmark.export_curve = true;
        }
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "benchmarks.export_curve", .. }
        ));
        assert!(err.to_string().contains("3 benchmarks"));
    }

    #[test]
    fn window_falls_back_to_trade_span() {
        let analysis = AnalysisConfig::default();
        let first = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        assert_eq!(analysis.window(first, last), (first, last));
    }
}
