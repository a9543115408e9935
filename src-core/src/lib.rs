pub mod errors;
pub mod indicators;
pub mod market_data;
pub mod resolver;
pub mod securities;

pub use errors::{Error, Result};
pub use resolver::{ExhaustedError, FailedAttempt, ProviderHandle, Resolved};
