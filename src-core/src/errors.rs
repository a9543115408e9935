use thiserror::Error;

use crate::market_data::MarketDataError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the advisor core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("ISIN {0} is not in the supported securities table")]
    UnknownIsin(String),

    #[error("Input validation failed: {0}")]
    Validation(String),
}
