use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use advisor_ai::ReportEngine;
use advisor_core::market_data::{AdvisorDataService, ProviderRegistry};

pub struct AppState {
    pub data_service: Arc<AdvisorDataService>,
    pub report_engine: Arc<ReportEngine>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let registry = Arc::new(ProviderRegistry::new(config.market_data.clone())?);
    tracing::info!(
        "Market data providers: {}",
        registry.active_providers().join(", ")
    );

    let data_service = Arc::new(AdvisorDataService::new(registry));

    let report_engine = Arc::new(ReportEngine::new(config.llm.clone()));
    let llm_providers = report_engine.active_providers();
    if llm_providers.is_empty() {
        // Startup proceeds; report requests will fail with an exhaustion
        // error until a key is configured.
        tracing::warn!(
            "No LLM providers configured. Set GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY."
        );
    } else {
        tracing::info!("LLM providers: {}", llm_providers.join(", "));
    }

    Ok(Arc::new(AppState {
        data_service,
        report_engine,
    }))
}
