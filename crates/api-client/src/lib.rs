use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use core_types::PricePoint;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info};

pub mod error;
pub mod registry;
pub mod yahoo;
// --- Public API ---
pub use registry::ProviderRegistry;
pub use yahoo::YahooClient;

const BINANCE_SPOT_URL: &str = "https://api.binance.com";
const KLINE_PAGE_LIMIT: usize = 1000;
const DAY_MS: i64 = 86_400_000;

/// The generic, abstract interface for a daily price source.
/// The pipeline only sees this trait, so live clients and test stubs can be
/// swapped freely.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches one close per trading day in `[start, end]`, oldest first.
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError>;
}

/// Public spot market data from Binance. No credentials are needed.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(BINANCE_SPOT_URL)
    }

    /// Points the client at another host, e.g. a local mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawKline>, ApiError> {
        let url = format!("{}/api/v3/klines", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", "1d"),
                ("startTime", &start_ms.to_string()),
                ("endTime", &end_ms.to_string()),
                ("limit", &KLINE_PAGE_LIMIT.to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<Vec<RawKline>>(&text)
                .map_err(|e| ApiError::Deserialization(e.to_string()))
        } else if let Ok(error) = serde_json::from_str::<BinanceErrorResponse>(&text) {
            Err(ApiError::BinanceError {
                symbol: symbol.to_string(),
                code: error.code,
                message: error.msg,
            })
        } else {
            Err(ApiError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

// Intermediate struct for deserializing klines from Binance API
#[derive(Deserialize)]
struct RawKline(i64, String, String, String, String, String, i64, String, i64, String, String, String);

impl RawKline {
    fn to_price_point(&self) -> Result<PricePoint, ApiError> {
        let date = DateTime::from_timestamp_millis(self.0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid open_time: {}", self.0)))?;
        let close = Decimal::from_str(&self.4).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(PricePoint { date, close })
    }
}

#[derive(Deserialize)]
struct BinanceErrorResponse {
    code: i64,
    msg: String,
}

#[async_trait]
impl PriceProvider for BinanceClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let start_ms = start.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        let end_ms = end.and_time(NaiveTime::MIN).and_utc().timestamp_millis() + DAY_MS - 1;

        let mut prices = Vec::new();
        let mut cursor = start_ms;
        while cursor <= end_ms {
            let page = self.fetch_page(symbol, cursor, end_ms).await?;
            debug!(symbol, cursor, bars = page.len(), "Fetched kline page.");

            let Some(last) = page.last() else { break };
            cursor = last.0 + DAY_MS;
            let full_page = page.len() >= KLINE_PAGE_LIMIT;

            for raw in &page {
                prices.push(raw.to_price_point()?);
            }
            if !full_page {
                break;
            }
        }

        info!(symbol, bars = prices.len(), "Binance daily closes fetched.");
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn kline_json(open_ms: i64, close: &str) -> String {
        format!(
            r#"[{open_ms},"1.0","2.0","0.5","{close}","10.0",{},"10.0",5,"1.0","1.0","0"]"#,
            open_ms + DAY_MS - 1
        )
    }

    #[tokio::test]
    async fn parses_daily_klines() {
        let mut server = mockito::Server::new_async().await;
        let start = date(2024, 1, 1);
        let start_ms = 1_704_067_200_000;
        let body = format!(
            "[{},{}]",
            kline_json(start_ms, "42000.50"),
            kline_json(start_ms + DAY_MS, "43000.00")
        );
        let mock = server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
                Matcher::UrlEncoded("startTime".into(), start_ms.to_string()),
            ]))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url());
        let prices = client
            .fetch_daily_closes("BTCUSDT", start, date(2024, 1, 2))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].date, start);
        assert_eq!(prices[0].close, Decimal::from_str("42000.50").unwrap());
        assert_eq!(prices[1].date, date(2024, 1, 2));
    }

    #[tokio::test]
    async fn pages_until_a_short_page() {
        let mut server = mockito::Server::new_async().await;
        let start = date(2020, 1, 1);
        let start_ms = start.and_time(NaiveTime::MIN).and_utc().timestamp_millis();

        let first_page: Vec<String> = (0..KLINE_PAGE_LIMIT as i64)
            .map(|i| kline_json(start_ms + i * DAY_MS, "100"))
            .collect();
        let second_start = start_ms + KLINE_PAGE_LIMIT as i64 * DAY_MS;

        let first = server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::UrlEncoded("startTime".into(), start_ms.to_string()))
            .with_body(format!("[{}]", first_page.join(",")))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::UrlEncoded("startTime".into(), second_start.to_string()))
            .with_body(format!("[{}]", kline_json(second_start, "101")))
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url());
        let prices = client
            .fetch_daily_closes("BTCUSDT", start, date(2023, 1, 1))
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(prices.len(), KLINE_PAGE_LIMIT + 1);
        assert!(prices.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn surfaces_binance_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url());
        let err = client
            .fetch_daily_closes("NOPE", date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap_err();

        match err {
            ApiError::BinanceError { symbol, code, .. } => {
                assert_eq!(symbol, "NOPE");
                assert_eq!(code, -1121);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_range_returns_no_prices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/klines")
            .match_query(Matcher::Any)
            .with_body("[]")
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url());
        let prices = client
            .fetch_daily_closes("BTCUSDT", date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();
        assert!(prices.is_empty());
    }
}
