use crate::error::ApiError;
use crate::{BinanceClient, PriceProvider, YahooClient};
use chrono::NaiveDate;
use configuration::{BenchmarkConfig, BenchmarkSource};
use core_types::PricePoint;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps each benchmark source to the provider that serves it.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<BenchmarkSource, Arc<dyn PriceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The production registry: Binance spot and Yahoo Finance.
    pub fn live() -> Result<Self, ApiError> {
        Ok(Self::new()
            .with_provider(BenchmarkSource::Binance, Arc::new(BinanceClient::new()))
            .with_provider(BenchmarkSource::Yahoo, Arc::new(YahooClient::new()?)))
    }

    pub fn with_provider(mut self, source: BenchmarkSource, provider: Arc<dyn PriceProvider>) -> Self {
        self.providers.insert(source, provider);
        self
    }

    pub fn get(&self, source: BenchmarkSource) -> Result<Arc<dyn PriceProvider>, ApiError> {
        self.providers
            .get(&source)
            .cloned()
            .ok_or_else(|| ApiError::UnsupportedSource(format!("{:?}", source).to_lowercase()))
    }

    /// Fetches a configured benchmark's daily closes from its source.
    pub async fn fetch(
        &self,
        benchmark: &BenchmarkConfig,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ApiError> {
        self.get(benchmark.source)?
            .fetch_daily_closes(&benchmark.symbol, start, end)
            .await
    }
}
