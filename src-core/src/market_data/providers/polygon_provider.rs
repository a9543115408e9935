use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{CompanyProfile, DataSource, Quote};
use crate::market_data::providers::market_data_provider::MarketDataProvider;
use crate::resolver::ProviderHandle;

const BASE_URL: &str = "https://api.polygon.io";

/// Keyed last-resort data source backed by Polygon.io aggregates.
pub struct PolygonProvider {
    client: Client,
    token: Option<String>,
}

impl PolygonProvider {
    pub fn new(token: Option<String>) -> Self {
        PolygonProvider {
            client: Client::new(),
            token,
        }
    }

    async fn fetch_aggs(&self, path: &str) -> Result<AggsResponse, MarketDataError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| MarketDataError::NotConfigured(self.name().to_string()))?;

        let url = format!("{}{}?adjusted=true&apiKey={}", BASE_URL, path, token);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MarketDataError::ProviderError(format!(
                "Polygon API error: {}",
                error_body
            )));
        }

        let parsed: AggsResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::ParsingError(e.to_string()))?;
        Ok(parsed)
    }

    fn bar_to_quote(&self, symbol: &str, bar: &AggBar) -> Result<Quote, MarketDataError> {
        // Polygon timestamps are Unix milliseconds.
        let timestamp = Utc
            .timestamp_millis_opt(bar.timestamp)
            .single()
            .ok_or_else(|| {
                MarketDataError::ParsingError(format!("Invalid timestamp: {}", bar.timestamp))
            })?;
        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            currency: "USD".to_string(),
            data_source: DataSource::Polygon,
        })
    }
}

impl ProviderHandle for PolygonProvider {
    fn name(&self) -> &str {
        DataSource::Polygon.as_str()
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl MarketDataProvider for PolygonProvider {
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let path = format!("/v2/aggs/ticker/{}/prev", symbol);
        let response = self.fetch_aggs(&path).await?;

        let bar = response
            .results
            .as_ref()
            .and_then(|bars| bars.first())
            .ok_or_else(|| MarketDataError::NotFound(format!("No quote data for {}", symbol)))?;

        self.bar_to_quote(symbol, bar)
    }

    async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let path = format!(
            "/v2/aggs/ticker/{}/range/1/day/{}/{}",
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        let response = self.fetch_aggs(&path).await?;

        let bars = response
            .results
            .ok_or_else(|| MarketDataError::NotFound(format!("No history for {}", symbol)))?;

        let mut quotes = Vec::with_capacity(bars.len());
        for bar in &bars {
            quotes.push(self.bar_to_quote(symbol, bar)?);
        }
        quotes.sort_by_key(|q| q.timestamp);

        Ok(quotes)
    }

    async fn get_company_profile(&self, _symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        // Aggregates-only integration; profile requests fall through to the
        // next provider in the list.
        Err(MarketDataError::ProviderError(
            "Company profiles are not supported by Polygon.io".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct AggsResponse {
    results: Option<Vec<AggBar>>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    #[serde(rename = "t")]
    timestamp: i64,
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_provider_reports_itself() {
        let provider = PolygonProvider::new(None);
        assert!(!provider.is_configured());
        assert_eq!(provider.name(), "POLYGON");
    }

    #[test]
    fn parses_aggregate_bars() {
        let body = r#"{
            "ticker": "NVDA",
            "queryCount": 1,
            "resultsCount": 1,
            "adjusted": true,
            "results": [
                {"v": 180500000.0, "vw": 131.2, "o": 130.0, "c": 131.5, "h": 132.4, "l": 129.1, "t": 1749772800000, "n": 900000}
            ],
            "status": "OK"
        }"#;

        let parsed: AggsResponse = serde_json::from_str(body).unwrap();
        let bars = parsed.results.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 131.5);

        let provider = PolygonProvider::new(Some("key".to_string()));
        let quote = provider.bar_to_quote("NVDA", &bars[0]).unwrap();
        assert_eq!(quote.symbol, "NVDA");
        assert_eq!(quote.data_source, DataSource::Polygon);
        assert_eq!(quote.timestamp.format("%Y-%m-%d").to_string(), "2025-06-13");
    }

    #[tokio::test]
    async fn profile_requests_always_fail_over() {
        let provider = PolygonProvider::new(Some("key".to_string()));
        let err = provider.get_company_profile("NVDA").await.unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError(_)));
    }
}
