use std::{net::SocketAddr, time::Duration};

use advisor_core::market_data::MarketDataConfig;
use advisor_ai::LlmConfig;

/// Immutable runtime configuration, read from the environment exactly once
/// at startup and handed to the services at construction.
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub market_data: MarketDataConfig,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("ADVISOR_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()
            .expect("Invalid ADVISOR_LISTEN_ADDR");
        let cors_allow = std::env::var("ADVISOR_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("ADVISOR_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "120000".into())
            .parse()
            .unwrap_or(120000);

        let market_data = MarketDataConfig {
            alpha_vantage_api_key: env_opt("ALPHA_VANTAGE_API_KEY"),
            polygon_api_key: env_opt("POLYGON_API_KEY"),
        };
        let llm = LlmConfig {
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
        };

        Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            market_data,
            llm,
        }
    }
}

/// Empty strings count as unset so `KEY=` in a .env file does not activate
/// a provider.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
