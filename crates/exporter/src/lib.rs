//! # Report Exporter
//!
//! Writes the results of a run as CSV tables into the configured output
//! directory. Every table is written once, at the end of the run.
//!
//! ## Public API
//!
//! - `CsvExporter`: Owns the output directory and provides the `save_*` methods
//!   (KPIs, benchmark comparison, equity curves, per-trade results).
//! - `forward_fill_daily`: Expands a sparse curve to one point per calendar day.
//! - `ExportError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod curve;
pub mod error;
pub mod writer;

// Re-export the key components to create a clean, public-facing API.
pub use curve::{forward_fill_daily, strategy_points};
pub use error::ExportError;
pub use writer::{
    BENCHMARK_KPIS_FILE, CsvExporter, KPIS_FILE, STRATEGY_CURVE_FILE, TRADES_FILE,
    benchmark_curve_file,
};
