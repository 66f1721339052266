//! # Report Pipeline
//!
//! Runs one analysis from the trade file to the exported tables:
//! load, equity curve, KPIs with rolling metrics and the Monte Carlo stress
//! test, benchmark comparison, export.
//!
//! ## Public API
//!
//! - `ReportPipeline`: Holds the configuration and the price providers and
//!   executes a run.
//! - `RunSummary`: What a finished run produced.
//! - `PipelineError`: The specific error types that can be returned from this crate.

pub mod error;

pub use error::PipelineError;

use analytics::{
    AnalyticsEngine, BenchmarkReport, BenchmarkSeries, EquityCurve, KpiReport, MonteCarloResult,
    MonteCarloSimulator, align_prices,
};
use api_client::ProviderRegistry;
use chrono::NaiveDate;
use configuration::{BenchmarkConfig, Config};
use exporter::{CsvExporter, STRATEGY_CURVE_FILE, benchmark_curve_file, forward_fill_daily, strategy_points};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

/// The name of the strategy row in the benchmark table.
pub const STRATEGY_NAME: &str = "Strategy";

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub trades: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kpis: KpiReport,
    pub monte_carlo: MonteCarloResult,
    /// Strategy row first, then one row per benchmark. Empty for offline runs.
    pub benchmarks: Vec<BenchmarkReport>,
    pub files: Vec<PathBuf>,
}

/// The end-to-end report run.
pub struct ReportPipeline {
    config: Config,
    providers: ProviderRegistry,
}

impl ReportPipeline {
    pub fn new(config: Config, providers: ProviderRegistry) -> Self {
        Self { config, providers }
    }

    /// Runs the full analysis, including the benchmark comparison.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.execute(true).await
    }

    /// Runs the strategy analysis only. No market data is fetched.
    pub async fn run_offline(&self) -> Result<RunSummary, PipelineError> {
        self.execute(false).await
    }

    async fn execute(&self, with_benchmarks: bool) -> Result<RunSummary, PipelineError> {
        // --- 1. Load ---
        let trades = loader::load_trades(&self.config.input.path, &self.config.input)?;
        let first = trades[0].date;
        let last = trades[trades.len() - 1].date;
        let (start, end) = self.config.analysis.window(first, last);
        info!(%start, %end, trades = trades.len(), "Analysis window resolved.");

        // --- 2. Strategy statistics ---
        let curve = EquityCurve::from_trades(&trades)?;
        let engine = AnalyticsEngine::new(self.config.analysis.clone());
        let rolling = engine.rolling(&curve)?;
        let monte_carlo = MonteCarloSimulator::new(self.config.monte_carlo.clone()).run(curve.factors())?;
        let kpis = engine.calculate(&trades, &curve)?.with_monte_carlo(&monte_carlo);
        info!(
            total_return = kpis.total_return,
            max_drawdown = kpis.max_drawdown,
            sharpe = ?kpis.sharpe_annualized,
            "Strategy KPIs calculated."
        );

        // --- 3. Benchmarks ---
        let series = if with_benchmarks {
            self.fetch_benchmarks(start, end).await?
        } else {
            Vec::new()
        };
        let mut benchmarks = Vec::new();
        if !series.is_empty() {
            benchmarks.push(BenchmarkReport::from_strategy(STRATEGY_NAME, &kpis));
            benchmarks.extend(
                series
                    .iter()
                    .map(|s| BenchmarkReport::from_series(s, &self.config.analysis)),
            );
        }

        // --- 4. Export ---
        let exporter = CsvExporter::new(&self.config.output.dir)?;
        let mut files = vec![
            exporter.save_kpis(&kpis)?,
            exporter.save_trade_results(&trades, &curve, &rolling)?,
            exporter.save_equity_curve(
                STRATEGY_CURVE_FILE,
                &forward_fill_daily(&strategy_points(&trades, &curve), start, end),
            )?,
        ];
        if !benchmarks.is_empty() {
            files.push(exporter.save_benchmark_kpis(&benchmarks)?);
        }
        if let Some(curve_benchmark) = self.config.curve_benchmark() {
            if let Some(s) = series.iter().find(|s| s.name == curve_benchmark.name) {
                files.push(exporter.save_equity_curve(
                    &benchmark_curve_file(&s.name),
                    &forward_fill_daily(&s.equity_points(), start, end),
                )?);
            }
        }
        info!(dir = %exporter.dir().display(), files = files.len(), "Run complete.");

        Ok(RunSummary {
            trades: trades.len(),
            start,
            end,
            kpis,
            monte_carlo,
            benchmarks,
            files,
        })
    }

    /// Downloads every configured benchmark concurrently and builds its
    /// series. Any failed download aborts the run.
    async fn fetch_benchmarks(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkSeries>, PipelineError> {
        let benchmarks = &self.config.benchmarks;
        if benchmarks.is_empty() {
            warn!("No benchmarks configured, skipping comparison.");
            return Ok(Vec::new());
        }

        let progress_bar = ProgressBar::new(benchmarks.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );
        progress_bar.set_message("Fetching benchmarks");

        let downloads = benchmarks.iter().map(|benchmark| {
            let progress_bar = progress_bar.clone();
            async move {
                let result = self.providers.fetch(benchmark, start, end).await;
                progress_bar.inc(1);
                (benchmark, result)
            }
        });
        let results = join_all(downloads).await;
        progress_bar.finish_with_message("Benchmarks fetched");

        results
            .into_iter()
            .map(|(benchmark, result)| {
                let prices = result.map_err(|source| PipelineError::Benchmark {
                    name: benchmark.name.clone(),
                    source,
                })?;
                build_series(benchmark, &prices, start, end)
            })
            .collect()
    }
}

fn build_series(
    benchmark: &BenchmarkConfig,
    prices: &[core_types::PricePoint],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BenchmarkSeries, PipelineError> {
    let aligned = align_prices(prices, start, end);
    let series = BenchmarkSeries::from_prices(&benchmark.name, &aligned).map_err(|source| {
        PipelineError::BenchmarkData {
            name: benchmark.name.clone(),
            source,
        }
    })?;
    info!(
        benchmark = %benchmark.name,
        symbol = %benchmark.symbol,
        days = series.dates.len(),
        "Benchmark series aligned."
    );
    Ok(series)
}
