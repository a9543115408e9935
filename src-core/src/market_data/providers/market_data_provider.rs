use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{CompanyProfile, Quote};
use crate::resolver::ProviderHandle;

/// A ranked source of quotes and company data.
///
/// Implementations report their configuration state through [`ProviderHandle`];
/// unconfigured providers are skipped by the registry without an attempt.
#[async_trait]
pub trait MarketDataProvider: ProviderHandle {
    /// Most recent daily quote for a symbol.
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Daily quotes between `start` and `end`, ordered oldest-first.
    async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError>;

    /// Company reference data, analyst consensus and fundamentals.
    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError>;
}
