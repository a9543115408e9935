pub(crate) mod alpha_vantage_provider;
pub(crate) mod market_data_provider;
pub(crate) mod polygon_provider;
pub(crate) mod provider_registry;
pub(crate) mod yahoo_provider;

pub use market_data_provider::MarketDataProvider;
pub use provider_registry::{MarketDataConfig, ProviderRegistry};
