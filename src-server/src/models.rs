use advisor_core::indicators::Trend;
use advisor_core::securities::Security;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub isin: String,
    pub asset_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdviseRequest {
    pub isin: String,
    pub asset_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub ticker: String,
    pub isin: String,
    pub report: String,
    pub metadata: AnalyzeMetadata,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeMetadata {
    pub asset_name: String,
    pub sector: String,
    pub fetched_at: DateTime<Utc>,
    pub llm_provider: String,
    pub data_provider: String,
}

#[derive(Debug, Serialize)]
pub struct AdviseResponse {
    pub success: bool,
    pub ticker: String,
    pub isin: String,
    pub advisory_report: String,
    pub technical_data: TechnicalData,
    pub metadata: AdviseMetadata,
}

/// Key levels echoed alongside the advisory so clients can render them
/// without parsing the Markdown.
#[derive(Debug, Serialize)]
pub struct TechnicalData {
    pub rsi: Option<f64>,
    pub trend: Trend,
    pub support_level: f64,
    pub resistance_level: f64,
    pub current_price: f64,
    pub target_price: Option<f64>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdviseMetadata {
    pub asset_name: String,
    pub sector: String,
    pub data_timestamp: DateTime<Utc>,
    pub analyst_count: u32,
    pub llm_provider: String,
    pub data_provider: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SecuritiesResponse {
    pub total_count: usize,
    pub securities: &'static [Security],
}
