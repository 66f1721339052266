//! # Trade Record Loader
//!
//! Reads the delimited trade file produced by the backtest and turns it into
//! date-ordered `TradeRecord`s. Dates are normalized from day/month/year and
//! numeric cells tolerate percent signs and decimal commas. Any malformed row
//! aborts the load with the offending line and column.

pub mod error;
pub mod reader;

pub use error::LoaderError;
pub use reader::{load_trades, parse_trades};
