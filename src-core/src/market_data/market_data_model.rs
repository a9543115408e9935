use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the market data source a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    Yahoo,
    AlphaVantage,
    Polygon,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Yahoo => "YAHOO",
            DataSource::AlphaVantage => "ALPHA_VANTAGE",
            DataSource::Polygon => "POLYGON",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub currency: String,
    pub data_source: DataSource,
}

/// Company reference data, analyst consensus and valuation metrics.
///
/// Every numeric field is optional: providers differ widely in coverage and
/// ETFs have no analyst opinions at all. Missing values are surfaced as "N/A"
/// further up the stack, never invented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,

    // Analyst consensus
    pub target_mean_price: Option<f64>,
    pub target_high_price: Option<f64>,
    pub target_low_price: Option<f64>,
    pub recommendation_key: Option<String>,
    pub number_of_analysts: Option<u32>,

    // Valuation and fundamentals
    pub forward_pe: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub price_to_book: Option<f64>,
    pub profit_margins: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
}
