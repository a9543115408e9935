use std::sync::Arc;

use futures::FutureExt;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{CompanyProfile, Quote};
use crate::market_data::providers::alpha_vantage_provider::AlphaVantageProvider;
use crate::market_data::providers::market_data_provider::MarketDataProvider;
use crate::market_data::providers::polygon_provider::PolygonProvider;
use crate::market_data::providers::yahoo_provider::YahooProvider;
use crate::resolver::{resolve, ProviderHandle, Resolved};
use chrono::{DateTime, Utc};

/// Credentials for the keyed fallback sources. Yahoo needs none and is
/// always first.
#[derive(Debug, Clone, Default)]
pub struct MarketDataConfig {
    pub alpha_vantage_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
}

/// Ordered market data sources: Yahoo, then Alpha Vantage, then Polygon.
/// Every fetch walks the list through the fallback resolver.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl ProviderRegistry {
    pub fn new(config: MarketDataConfig) -> Result<Self, MarketDataError> {
        let yahoo = YahooProvider::new()?;
        let alpha_vantage = AlphaVantageProvider::new(config.alpha_vantage_api_key);
        let polygon = PolygonProvider::new(config.polygon_api_key);

        Ok(ProviderRegistry {
            providers: vec![
                Arc::new(yahoo),
                Arc::new(alpha_vantage),
                Arc::new(polygon),
            ],
        })
    }

    /// Names of the configured providers, in fallback order.
    pub fn active_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name().to_string())
            .collect()
    }

    pub async fn latest_quote(&self, symbol: &str) -> Result<Resolved<Quote>, MarketDataError> {
        resolve(&self.providers, |p| p.get_latest_quote(symbol).boxed())
            .await
            .map_err(MarketDataError::from)
    }

    pub async fn historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Resolved<Vec<Quote>>, MarketDataError> {
        resolve(&self.providers, |p| {
            p.get_historical_quotes(symbol, start, end).boxed()
        })
        .await
        .map_err(MarketDataError::from)
    }

    pub async fn company_profile(
        &self,
        symbol: &str,
    ) -> Result<Resolved<CompanyProfile>, MarketDataError> {
        resolve(&self.providers, |p| p.get_company_profile(symbol).boxed())
            .await
            .map_err(MarketDataError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ProviderHandle;

    #[test]
    fn providers_are_ordered_yahoo_first() {
        let registry = ProviderRegistry::new(MarketDataConfig {
            alpha_vantage_api_key: Some("av-key".to_string()),
            polygon_api_key: None,
        })
        .unwrap();

        let names: Vec<&str> = registry.providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["YAHOO", "ALPHA_VANTAGE", "POLYGON"]);
        assert_eq!(registry.active_providers(), vec!["YAHOO", "ALPHA_VANTAGE"]);
    }

    #[test]
    fn yahoo_is_always_configured() {
        let registry = ProviderRegistry::new(MarketDataConfig::default()).unwrap();
        assert_eq!(registry.active_providers(), vec!["YAHOO"]);
    }
}
