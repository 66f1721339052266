//! Daily index history from Yahoo Finance.
//!
//! Symbols are passed through unchanged, so index tickers keep their caret
//! (`^GSPC`, `^IXIC`).

use crate::PriceProvider;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate};
use core_types::PricePoint;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{info, warn};
use yahoo_finance_api as yahoo;

pub struct YahooClient {
    connector: yahoo::YahooConnector,
}

impl YahooClient {
    pub fn new() -> Result<Self, ApiError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| ApiError::Yahoo {
            symbol: String::new(),
            message: format!("failed to create connector: {}", e),
        })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let yahoo_error = |message: String| ApiError::Yahoo {
            symbol: symbol.to_string(),
            message,
        };

        // The end bound is exclusive on Yahoo's side.
        let start_at = to_offset_datetime(start)?;
        let end_at = to_offset_datetime(end.succ_opt().unwrap_or(end))?;

        let response = self
            .connector
            .get_quote_history_interval(symbol, start_at, end_at, "1d")
            .await
            .map_err(|e| yahoo_error(e.to_string()))?;
        let quotes = response.quotes().map_err(|e| yahoo_error(e.to_string()))?;

        if quotes.is_empty() {
            warn!(symbol, "Yahoo Finance returned no quotes.");
        }

        let mut prices: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| quote_to_price(q.timestamp as i64, q.close))
            .collect();
        prices.sort_by_key(|p| p.date);

        info!(symbol, bars = prices.len(), "Yahoo daily closes fetched.");
        Ok(prices)
    }
}

/// Converts a quote's Unix timestamp and close into a dated price. Quotes
/// with an unrepresentable timestamp or close are skipped.
fn quote_to_price(timestamp: i64, close: f64) -> Option<PricePoint> {
    let date = DateTime::from_timestamp(timestamp, 0)?.date_naive();
    let close = Decimal::from_f64_retain(close)?;
    Some(PricePoint { date, close })
}

fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, ApiError> {
    let invalid = |e: time::error::ComponentRange| ApiError::InvalidData(format!("{}: {}", date, e));
    let month = time::Month::try_from(date.month() as u8).map_err(invalid)?;
    let day = time::Date::from_calendar_date(date.year(), month, date.day() as u8).map_err(invalid)?;
    Ok(day.midnight().assume_utc())
}
