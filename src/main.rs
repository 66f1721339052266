use analytics::{BenchmarkReport, KpiReport};
use anyhow::{Context, Result};
use api_client::ProviderRegistry;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, CellAlignment, Table};
use configuration::{Config, load_config};
use pipeline::{ReportPipeline, RunSummary};
use std::path::{Path, PathBuf};
use tracing::{Instrument, info, info_span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

/// The main entry point for the backtest report.
#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional; it may carry RUST_LOG.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let (args, offline) = match &cli.command {
        Commands::Run(args) => (args, false),
        Commands::Kpis(args) => (args, true),
    };

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let _guard = init_logging(&config.output.dir)?;

    let run_id = Uuid::new_v4();
    let summary = handle_run(config, offline)
        .instrument(info_span!("run", %run_id))
        .await?;

    print_summary(&summary);
    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance report and benchmark comparison for a list of backtested trades.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the trades, compare against the benchmarks and export every table.
    Run(RunArgs),
    /// Analyze the trades only, without downloading benchmark prices.
    Kpis(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the TOML configuration. Built-in defaults apply when it is missing.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

// ==============================================================================
// Run Logic
// ==============================================================================

async fn handle_run(config: Config, offline: bool) -> Result<RunSummary> {
    info!(
        input = %config.input.path.display(),
        output = %config.output.dir.display(),
        offline,
        "Starting report run."
    );

    let providers = if offline {
        ProviderRegistry::new()
    } else {
        ProviderRegistry::live().context("Failed to initialize the market data clients")?
    };
    let pipeline = ReportPipeline::new(config, providers);

    let summary = if offline {
        pipeline.run_offline().await
    } else {
        pipeline.run().await
    }
    .context("Report run failed")?;

    Ok(summary)
}

/// Logs to stdout and to `run.log` in the output directory. `RUST_LOG`
/// overrides the default `info` level.
fn init_logging(output_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(output_dir, "run.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

// ==============================================================================
// Terminal Summary
// ==============================================================================

fn print_summary(summary: &RunSummary) {
    println!(
        "\n{} trades, {} to {}",
        summary.trades, summary.start, summary.end
    );
    println!("{}", kpi_table(&summary.kpis));
    if !summary.benchmarks.is_empty() {
        println!("{}", benchmark_table(&summary.benchmarks));
    }
    for file in &summary.files {
        println!("wrote {}", file.display());
    }
}

fn kpi_table(kpis: &KpiReport) -> Table {
    let rows = [
        ("Trades", kpis.total_trades.to_string()),
        ("Win rate", pct(Some(kpis.win_rate))),
        ("Profit factor", ratio(kpis.profit_factor)),
        ("Expectancy", pct(Some(kpis.expectancy))),
        ("Total return", pct(Some(kpis.total_return))),
        ("CAGR", pct(kpis.cagr)),
        ("Annualized volatility", pct(kpis.annualized_volatility)),
        ("Max drawdown", pct(Some(kpis.max_drawdown))),
        ("Sharpe (annualized)", ratio(kpis.sharpe_annualized)),
        ("Sortino (annualized)", ratio(kpis.sortino_annualized)),
        ("Calmar", ratio(kpis.calmar_ratio)),
        ("VaR", pct(kpis.var)),
        ("CVaR", pct(kpis.cvar)),
        ("MC 1st percentile", pct(kpis.mc_p1)),
        ("MC 5th percentile", pct(kpis.mc_p5)),
        ("MC median", pct(kpis.mc_median)),
        ("MC probability of loss", pct(kpis.mc_prob_loss)),
    ];

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value).set_alignment(CellAlignment::Right)]);
    }
    table
}

fn benchmark_table(rows: &[BenchmarkReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Asset", "Total return", "CAGR", "Ann. return", "Ann. vol", "Sharpe", "Sortino", "Max DD",
        "Calmar",
    ]);
    for row in rows {
        table.add_row(vec![
            row.name.clone(),
            pct(Some(row.total_return)),
            pct(row.cagr),
            pct(row.annualized_return),
            pct(row.annualized_volatility),
            ratio(row.sharpe_ratio),
            ratio(row.sortino_ratio),
            pct(Some(row.max_drawdown)),
            ratio(row.calmar_ratio),
        ]);
    }
    table
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
}
