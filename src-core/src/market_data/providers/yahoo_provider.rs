use std::sync::RwLock;
use std::time::SystemTime;

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use yahoo::YahooError;
use yahoo_finance_api as yahoo;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{CompanyProfile, DataSource, Quote};
use crate::market_data::providers::market_data_provider::MarketDataProvider;
use crate::resolver::ProviderHandle;

#[derive(Debug, Clone)]
pub struct CrumbData {
    pub cookie: String,
    pub crumb: String,
}

lazy_static! {
    static ref YAHOO_CRUMB: RwLock<Option<CrumbData>> = RwLock::default();
}

/// Keyless primary data source backed by Yahoo Finance.
pub struct YahooProvider {
    provider: yahoo::YahooConnector,
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let provider = yahoo::YahooConnector::new()?;
        Ok(YahooProvider {
            provider,
            client: Client::new(),
        })
    }

    fn yahoo_quote_to_quote(&self, symbol: &str, yahoo_quote: yahoo::Quote) -> Quote {
        let quote_timestamp: DateTime<Utc> = Utc
            .timestamp_opt(yahoo_quote.timestamp as i64, 0)
            .single()
            .unwrap_or_default();

        Quote {
            symbol: symbol.to_string(),
            timestamp: quote_timestamp,
            open: yahoo_quote.open,
            high: yahoo_quote.high,
            low: yahoo_quote.low,
            close: yahoo_quote.close,
            volume: yahoo_quote.volume as f64,
            currency: "USD".to_string(),
            data_source: DataSource::Yahoo,
        }
    }

    /// Obtain the session cookie and crumb Yahoo requires for quoteSummary
    /// calls and cache them process-wide.
    async fn set_crumb(&self) -> Result<(), MarketDataError> {
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError(e.to_string()))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|header| header.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(value, _)| value))
            .ok_or_else(|| {
                MarketDataError::ProviderError("Error parsing Yahoo crumb cookie".to_string())
            })?;

        let crumb_url = "https://query1.finance.yahoo.com/v1/test/getcrumb";
        let request = self
            .client
            .get(crumb_url)
            .header(header::USER_AGENT, "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36")
            .header(header::COOKIE, cookie)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError(e.to_string()))?;

        let crumb = request
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError(e.to_string()))?;

        let crumb_data = CrumbData {
            cookie: cookie.to_string(),
            crumb,
        };

        let mut yahoo_crumb = YAHOO_CRUMB
            .write()
            .map_err(|_| MarketDataError::Unknown("Crumb lock poisoned".to_string()))?;
        *yahoo_crumb = Some(crumb_data);

        Ok(())
    }

    async fn fetch_quote_summary(&self, symbol: &str) -> Result<QuoteSummaryResult, MarketDataError> {
        let needs_crumb = {
            let guard = YAHOO_CRUMB
                .read()
                .map_err(|_| MarketDataError::Unknown("Crumb lock poisoned".to_string()))?;
            guard.is_none()
        };
        if needs_crumb {
            self.set_crumb().await?;
        }

        let crumb_data = {
            let guard = YAHOO_CRUMB
                .read()
                .map_err(|_| MarketDataError::Unknown("Crumb lock poisoned".to_string()))?;
            guard
                .as_ref()
                .ok_or_else(|| {
                    MarketDataError::ProviderError(
                        "Yahoo authentication crumb not initialized".to_string(),
                    )
                })?
                .clone()
        };

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=price,summaryProfile,summaryDetail,financialData,defaultKeyStatistics&crumb={}",
            symbol, crumb_data.crumb
        );

        let response = self
            .client
            .get(&url)
            .header(
                "user-agent",
                "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.2; .NET CLR 1.0.3705;)",
            )
            .header("COOKIE", &crumb_data.cookie)
            .header("Crumb", &crumb_data.crumb)
            .send()
            .await?;

        let response_text = response.text().await?;

        let deserialized: QuoteSummaryResponse = serde_json::from_str(&response_text)
            .map_err(|e| MarketDataError::ParsingError(e.to_string()))?;

        deserialized
            .quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| MarketDataError::NotFound(format!("No profile data for {}", symbol)))
    }
}

impl ProviderHandle for YahooProvider {
    fn name(&self) -> &str {
        DataSource::Yahoo.as_str()
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooProvider {
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let response = self.provider.get_latest_quotes(symbol, "1d").await?;
        let yahoo_quote = response.last_quote().map_err(MarketDataError::from)?;
        Ok(self.yahoo_quote_to_quote(symbol, yahoo_quote))
    }

    async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let start_offset = SystemTime::from(start).into();
        let end_offset = SystemTime::from(end).into();

        let response = self
            .provider
            .get_quote_history(symbol, start_offset, end_offset)
            .await?;

        let quotes = response
            .quotes()?
            .into_iter()
            .map(|q| self.yahoo_quote_to_quote(symbol, q))
            .collect();

        Ok(quotes)
    }

    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        debug!("Fetching Yahoo quote summary for {}", symbol);
        let summary = self.fetch_quote_summary(symbol).await?;

        let price = summary.price;
        let profile_module = summary.summary_profile;
        let detail = summary.summary_detail;
        let financial = summary.financial_data;
        let statistics = summary.default_key_statistics;

        let profile = CompanyProfile {
            symbol: symbol.to_string(),
            name: price.as_ref().and_then(|p| p.long_name.clone()),
            sector: profile_module.as_ref().and_then(|p| p.sector.clone()),
            industry: profile_module.as_ref().and_then(|p| p.industry.clone()),
            currency: price.as_ref().and_then(|p| p.currency.clone()),
            target_mean_price: financial.as_ref().and_then(|f| raw(&f.target_mean_price)),
            target_high_price: financial.as_ref().and_then(|f| raw(&f.target_high_price)),
            target_low_price: financial.as_ref().and_then(|f| raw(&f.target_low_price)),
            recommendation_key: financial.as_ref().and_then(|f| f.recommendation_key.clone()),
            number_of_analysts: financial
                .as_ref()
                .and_then(|f| raw(&f.number_of_analyst_opinions))
                .map(|n| n as u32),
            forward_pe: detail.as_ref().and_then(|d| raw(&d.forward_pe)),
            trailing_pe: detail.as_ref().and_then(|d| raw(&d.trailing_pe)),
            peg_ratio: statistics.as_ref().and_then(|s| raw(&s.peg_ratio)),
            debt_to_equity: financial.as_ref().and_then(|f| raw(&f.debt_to_equity)),
            price_to_book: statistics.as_ref().and_then(|s| raw(&s.price_to_book)),
            profit_margins: financial.as_ref().and_then(|f| raw(&f.profit_margins)),
            revenue_growth: financial.as_ref().and_then(|f| raw(&f.revenue_growth)),
            earnings_growth: financial.as_ref().and_then(|f| raw(&f.earnings_growth)),
            market_cap: detail.as_ref().and_then(|d| raw(&d.market_cap)),
            beta: detail.as_ref().and_then(|d| raw(&d.beta)),
        };

        Ok(profile)
    }
}

fn raw(detail: &Option<PriceDetail>) -> Option<f64> {
    detail.as_ref().and_then(|d| d.raw)
}

// quoteSummary wire format. Yahoo wraps every numeric value in an object with
// a `raw` field that may itself be absent.

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    #[serde(rename = "summaryProfile")]
    summary_profile: Option<SummaryProfileModule>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialDataModule>,
    #[serde(rename = "defaultKeyStatistics")]
    default_key_statistics: Option<DefaultKeyStatisticsModule>,
}

#[derive(Debug, Deserialize)]
struct PriceDetail {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryProfileModule {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<PriceDetail>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<PriceDetail>,
    #[serde(rename = "marketCap")]
    market_cap: Option<PriceDetail>,
    beta: Option<PriceDetail>,
}

#[derive(Debug, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "targetMeanPrice")]
    target_mean_price: Option<PriceDetail>,
    #[serde(rename = "targetHighPrice")]
    target_high_price: Option<PriceDetail>,
    #[serde(rename = "targetLowPrice")]
    target_low_price: Option<PriceDetail>,
    #[serde(rename = "recommendationKey")]
    recommendation_key: Option<String>,
    #[serde(rename = "numberOfAnalystOpinions")]
    number_of_analyst_opinions: Option<PriceDetail>,
    #[serde(rename = "debtToEquity")]
    debt_to_equity: Option<PriceDetail>,
    #[serde(rename = "profitMargins")]
    profit_margins: Option<PriceDetail>,
    #[serde(rename = "revenueGrowth")]
    revenue_growth: Option<PriceDetail>,
    #[serde(rename = "earningsGrowth")]
    earnings_growth: Option<PriceDetail>,
}

#[derive(Debug, Deserialize)]
struct DefaultKeyStatisticsModule {
    #[serde(rename = "pegRatio")]
    peg_ratio: Option<PriceDetail>,
    #[serde(rename = "priceToBook")]
    price_to_book: Option<PriceDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_summary_with_missing_modules() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {"longName": "NVIDIA Corporation", "currency": "USD"},
                    "summaryProfile": {"sector": "Technology", "industry": "Semiconductors"},
                    "financialData": {
                        "targetMeanPrice": {"raw": 190.5},
                        "recommendationKey": "buy",
                        "numberOfAnalystOpinions": {"raw": 45}
                    }
                }]
            }
        }"#;

        let parsed: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.quote_summary.result.unwrap()[0];
        assert_eq!(
            result.price.as_ref().unwrap().long_name.as_deref(),
            Some("NVIDIA Corporation")
        );
        assert!(result.summary_detail.is_none());
        let financial = result.financial_data.as_ref().unwrap();
        assert_eq!(raw(&financial.target_mean_price), Some(190.5));
        assert_eq!(raw(&financial.number_of_analyst_opinions), Some(45.0));
        assert!(raw(&financial.debt_to_equity).is_none());
    }
}
