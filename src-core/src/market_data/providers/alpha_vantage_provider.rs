use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{CompanyProfile, DataSource, Quote};
use crate::market_data::providers::market_data_provider::MarketDataProvider;
use crate::resolver::ProviderHandle;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Keyed fallback data source backed by Alpha Vantage.
pub struct AlphaVantageProvider {
    client: Client,
    token: Option<String>,
}

impl AlphaVantageProvider {
    pub fn new(token: Option<String>) -> Self {
        AlphaVantageProvider {
            client: Client::new(),
            token,
        }
    }

    async fn fetch_data(
        &self,
        function: &str,
        params: Vec<(&str, &str)>,
    ) -> Result<String, MarketDataError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| MarketDataError::NotConfigured(self.name().to_string()))?;

        let mut query_params = params;
        query_params.push(("function", function));
        query_params.push(("apikey", token));

        let url = reqwest::Url::parse_with_params(BASE_URL, &query_params)
            .map_err(|e| MarketDataError::ProviderError(format!("Failed to build URL: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MarketDataError::ProviderError(format!(
                "AlphaVantage API error: {}",
                error_body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError(e.to_string()))?;
        Ok(text)
    }

    fn daily_bar_to_quote(
        &self,
        symbol: &str,
        date: &str,
        bar: &DailyBar,
    ) -> Result<Quote, MarketDataError> {
        let timestamp = parse_trading_day(date)?;
        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp,
            open: parse_field(&bar.open, "open")?,
            high: parse_field(&bar.high, "high")?,
            low: parse_field(&bar.low, "low")?,
            close: parse_field(&bar.close, "close")?,
            volume: parse_field(&bar.volume, "volume")?,
            currency: "USD".to_string(),
            data_source: DataSource::AlphaVantage,
        })
    }
}

impl ProviderHandle for AlphaVantageProvider {
    fn name(&self) -> &str {
        DataSource::AlphaVantage.as_str()
    }

    fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    async fn get_latest_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let params = vec![("symbol", symbol)];
        let response_text = self.fetch_data("GLOBAL_QUOTE", params).await?;
        let response_json: GlobalQuoteResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                MarketDataError::ParsingError(format!("Failed to parse latest quote: {}", e))
            })?;

        let global = response_json
            .global_quote
            .ok_or_else(|| MarketDataError::NotFound(format!("No quote data for {}", symbol)))?;

        let timestamp = parse_trading_day(&global.latest_trading_day)?;
        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp,
            open: parse_field(&global.open, "open")?,
            high: parse_field(&global.high, "high")?,
            low: parse_field(&global.low, "low")?,
            close: parse_field(&global.price, "price")?,
            volume: parse_field(&global.volume, "volume")?,
            currency: "USD".to_string(),
            data_source: DataSource::AlphaVantage,
        })
    }

    async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>, MarketDataError> {
        let params = vec![("symbol", symbol), ("outputsize", "full")];
        let response_text = self.fetch_data("TIME_SERIES_DAILY", params).await?;
        let response_json: TimeSeriesDaily = serde_json::from_str(&response_text).map_err(|e| {
            MarketDataError::ParsingError(format!("Failed to parse historical quotes: {}", e))
        })?;

        let series = response_json
            .time_series
            .ok_or_else(|| MarketDataError::NotFound(format!("No time series for {}", symbol)))?;

        let mut quotes = Vec::with_capacity(series.len());
        for (date, bar) in &series {
            let quote = self.daily_bar_to_quote(symbol, date, bar)?;
            if quote.timestamp >= start && quote.timestamp <= end {
                quotes.push(quote);
            }
        }
        // The wire format is a map keyed by date, so ordering is not given.
        quotes.sort_by_key(|q| q.timestamp);

        Ok(quotes)
    }

    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketDataError> {
        let params = vec![("symbol", symbol)];
        let response_text = self.fetch_data("OVERVIEW", params).await?;
        let overview: CompanyOverview = serde_json::from_str(&response_text).map_err(|e| {
            MarketDataError::ParsingError(format!("Failed to parse company overview: {}", e))
        })?;

        let symbol_field = overview
            .symbol
            .ok_or_else(|| MarketDataError::NotFound(format!("No overview data for {}", symbol)))?;

        let profile = CompanyProfile {
            symbol: symbol_field,
            name: overview.name,
            sector: overview.sector,
            industry: overview.industry,
            currency: overview.currency,
            target_mean_price: parse_opt(&overview.analyst_target_price),
            target_high_price: None,
            target_low_price: None,
            recommendation_key: None,
            number_of_analysts: None,
            forward_pe: parse_opt(&overview.forward_pe),
            trailing_pe: parse_opt(&overview.trailing_pe),
            peg_ratio: parse_opt(&overview.peg_ratio),
            debt_to_equity: None,
            price_to_book: parse_opt(&overview.price_to_book_ratio),
            profit_margins: parse_opt(&overview.profit_margin),
            revenue_growth: parse_opt(&overview.quarterly_revenue_growth_yoy),
            earnings_growth: parse_opt(&overview.quarterly_earnings_growth_yoy),
            market_cap: parse_opt(&overview.market_capitalization),
            beta: parse_opt(&overview.beta),
        };

        Ok(profile)
    }
}

fn parse_trading_day(date: &str) -> Result<DateTime<Utc>, MarketDataError> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| MarketDataError::ParsingError(format!("Invalid date format: {}", date)))?;
    day.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| MarketDataError::ParsingError(format!("Invalid timestamp: {}", date)))
}

fn parse_field(value: &str, field: &str) -> Result<f64, MarketDataError> {
    value
        .parse::<f64>()
        .map_err(|_| MarketDataError::ParsingError(format!("Invalid {} value: {}", field, value)))
}

/// Alpha Vantage returns "None" or "-" for fields it has no value for.
fn parse_opt(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|v| v.parse::<f64>().ok())
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "02. open")]
    open: String,
    #[serde(rename = "03. high")]
    high: String,
    #[serde(rename = "04. low")]
    low: String,
    #[serde(rename = "05. price")]
    price: String,
    #[serde(rename = "06. volume")]
    volume: String,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: String,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesDaily {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
}

#[derive(Debug, Deserialize)]
struct CompanyOverview {
    #[serde(rename = "Symbol")]
    symbol: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "Industry")]
    industry: Option<String>,
    #[serde(rename = "Currency")]
    currency: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_capitalization: Option<String>,
    #[serde(rename = "PEGRatio")]
    peg_ratio: Option<String>,
    #[serde(rename = "ProfitMargin")]
    profit_margin: Option<String>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    quarterly_earnings_growth_yoy: Option<String>,
    #[serde(rename = "QuarterlyRevenueGrowthYOY")]
    quarterly_revenue_growth_yoy: Option<String>,
    #[serde(rename = "AnalystTargetPrice")]
    analyst_target_price: Option<String>,
    #[serde(rename = "TrailingPE")]
    trailing_pe: Option<String>,
    #[serde(rename = "ForwardPE")]
    forward_pe: Option<String>,
    #[serde(rename = "PriceToBookRatio")]
    price_to_book_ratio: Option<String>,
    #[serde(rename = "Beta")]
    beta: Option<String>,
}
