//! # Backtest Analytics
//!
//! This crate turns a chronological list of closed trades into performance
//! statistics. It is the numerical core of the report.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of files or networks. It depends
//!   only on `core-types` and `configuration`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes trades and their
//!   equity curve and produces a `KpiReport`. Undefined statistics are `None`,
//!   never a silent zero or NaN.
//! - **Reproducibility:** The Monte Carlo stress test is seeded from the
//!   configuration, so identical input yields identical output.
//!
//! ## Public API
//!
//! - `EquityCurve`: Compounded equity, high-water mark and drawdown per trade.
//! - `AnalyticsEngine`: Computes the `KpiReport` and the `RollingMetrics`.
//! - `MonteCarloSimulator`: Bootstrap resampling of the trade growth factors.
//! - `BenchmarkSeries` / `BenchmarkReport`: Buy-and-hold comparison statistics.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

pub mod benchmark;
pub mod engine;
pub mod equity;
pub mod error;
pub mod monte_carlo;
pub mod report;
pub mod rolling;
pub mod stats;

pub use benchmark::{BenchmarkReport, BenchmarkSeries, align_prices};
pub use engine::AnalyticsEngine;
pub use equity::EquityCurve;
pub use error::AnalyticsError;
pub use monte_carlo::{MonteCarloResult, MonteCarloSimulator};
pub use report::KpiReport;
pub use rolling::RollingMetrics;
