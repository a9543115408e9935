pub(crate) mod market_data_errors;
pub(crate) mod market_data_model;
pub(crate) mod market_data_service;
pub mod providers;

pub use market_data_errors::MarketDataError;
pub use market_data_model::{CompanyProfile, DataSource, Quote};
pub use market_data_service::{AdvisorData, AdvisorDataService, CompanySnapshot, DataProviders};
pub use providers::{MarketDataConfig, MarketDataProvider, ProviderRegistry};
