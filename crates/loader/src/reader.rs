use crate::error::LoaderError;
use chrono::NaiveDate;
use configuration::InputConfig;
use core_types::{TradeRecord, TradeType};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Reads and normalizes the trade file at `path`.
pub fn load_trades(path: &Path, config: &InputConfig) -> Result<Vec<TradeRecord>, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let trades = parse_trades(file, config)?;
    info!(
        path = %path.display(),
        trades = trades.len(),
        first = %trades[0].date,
        last = %trades[trades.len() - 1].date,
        "Loaded trade records."
    );
    Ok(trades)
}

/// Parses trade rows from any reader and returns them in date order.
///
/// Parsing stops at the first malformed row. Same-day trades keep their file
/// order.
pub fn parse_trades<R: Read>(reader: R, config: &InputConfig) -> Result<Vec<TradeRecord>, LoaderError> {
    if !config.delimiter.is_ascii() {
        return Err(LoaderError::UnsupportedDelimiter(config.delimiter));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter as u8)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;
    let decimal_comma = config.delimiter != ',';

    let mut trades = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        trades.push(columns.parse_row(&record, line, &config.date_format, decimal_comma)?);
    }

    if trades.is_empty() {
        return Err(LoaderError::Empty);
    }

    let in_order = trades.windows(2).all(|w| w[0].date <= w[1].date);
    if !in_order {
        debug!("Trade rows are not in date order, sorting.");
    }
    trades.sort_by_key(|t| t.date);

    Ok(trades)
}

/// Positions of the required columns within a header row. Header names are
/// matched case-insensitively and in any order.
struct ColumnMap {
    id: usize,
    trade_type: usize,
    stop_loss_pct: usize,
    date: usize,
    return_pct: usize,
    risk_adj_return_pct: usize,
    variation_index: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoaderError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(LoaderError::MissingColumn(name))
        };

        Ok(Self {
            id: find("id")?,
            trade_type: find("type")?,
            stop_loss_pct: find("stop_loss_pct")?,
            date: find("date")?,
            return_pct: find("return_pct")?,
            risk_adj_return_pct: find("risk_adj_return_pct")?,
            variation_index: find("variation_index")?,
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        line: u64,
        date_format: &str,
        decimal_comma: bool,
    ) -> Result<TradeRecord, LoaderError> {
        let field = |index: usize| record.get(index).unwrap_or_default();
        let invalid = |column: &'static str, value: &str, reason: String| LoaderError::InvalidField {
            line,
            column,
            value: value.to_string(),
            reason,
        };

        let id = field(self.id);
        if id.is_empty() {
            return Err(invalid("id", id, "empty identifier".to_string()));
        }

        let raw_type = field(self.trade_type);
        let trade_type = TradeType::from_str(raw_type).map_err(|e| invalid("type", raw_type, e.to_string()))?;

        let raw_date = field(self.date);
        let date = parse_date(raw_date, date_format).map_err(|reason| invalid("date", raw_date, reason))?;

        let number = |column: &'static str, index: usize| {
            let raw = field(index);
            parse_decimal(raw, decimal_comma).map_err(|reason| invalid(column, raw, reason))
        };

        Ok(TradeRecord {
            id: id.to_string(),
            trade_type,
            stop_loss_pct: number("stop_loss_pct", self.stop_loss_pct)?,
            date,
            return_pct: number("return_pct", self.return_pct)?,
            risk_adj_return_pct: number("risk_adj_return_pct", self.risk_adj_return_pct)?,
            variation_index: number("variation_index", self.variation_index)?,
        })
    }
}

/// Parses a day/month/year date, accepting '-' and '.' in place of '/'.
pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    let normalized = if format.contains('/') {
        value.replace(['-', '.'], "/")
    } else {
        value.to_string()
    };

    NaiveDate::parse_from_str(&normalized, format).map_err(|e| e.to_string())
}

/// Parses a numeric cell, tolerating a trailing '%' and, for non-comma
/// delimited files, a decimal comma.
pub fn parse_decimal(value: &str, decimal_comma: bool) -> Result<Decimal, String> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    let normalized = if decimal_comma {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|e| e.to_string())
}
