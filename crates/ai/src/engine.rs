//! Report generation on top of the LLM registry.

use advisor_core::market_data::{AdvisorData, CompanySnapshot};
use log::info;

use crate::error::AiError;
use crate::prompts::{
    render_advisory_prompt, render_analysis_prompt, ADVISOR_SYSTEM_PROMPT, ANALYST_SYSTEM_PROMPT,
};
use crate::providers::{GenerationRequest, LlmConfig, LlmRegistry};

const ANALYSIS_TEMPERATURE: f64 = 0.7;
const ANALYSIS_MAX_TOKENS: u32 = 4000;
const ADVISORY_TEMPERATURE: f64 = 0.5;
const ADVISORY_MAX_TOKENS: u32 = 3000;

/// A finished Markdown report and the backend that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub markdown: String,
    pub provider: String,
}

/// Turns market snapshots into Markdown reports via the LLM fallback chain.
pub struct ReportEngine {
    registry: LlmRegistry,
}

impl ReportEngine {
    pub fn new(config: LlmConfig) -> Self {
        ReportEngine {
            registry: LlmRegistry::new(config),
        }
    }

    /// Names of the configured LLM backends, in fallback order.
    pub fn active_providers(&self) -> Vec<String> {
        self.registry.active_providers()
    }

    /// Fundamentals-oriented investment report for the analysis flow.
    pub async fn investment_report(
        &self,
        snapshot: &CompanySnapshot,
    ) -> Result<GeneratedReport, AiError> {
        let request = GenerationRequest {
            system_prompt: ANALYST_SYSTEM_PROMPT.to_string(),
            user_prompt: render_analysis_prompt(snapshot),
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: ANALYSIS_MAX_TOKENS,
        };

        let resolved = self.registry.generate(&request).await?;
        info!(
            "Generated investment report for {} via {}",
            snapshot.ticker, resolved.provider
        );
        Ok(GeneratedReport {
            markdown: resolved.payload,
            provider: resolved.provider,
        })
    }

    /// Technicals-driven trading advisory for the advise flow.
    pub async fn advisory_report(&self, data: &AdvisorData) -> Result<GeneratedReport, AiError> {
        let request = GenerationRequest {
            system_prompt: ADVISOR_SYSTEM_PROMPT.to_string(),
            user_prompt: render_advisory_prompt(data),
            temperature: ADVISORY_TEMPERATURE,
            max_tokens: ADVISORY_MAX_TOKENS,
        };

        let resolved = self.registry.generate(&request).await?;
        info!(
            "Generated trading advisory for {} via {}",
            data.ticker, resolved.provider
        );
        Ok(GeneratedReport {
            markdown: resolved.payload,
            provider: resolved.provider,
        })
    }
}
