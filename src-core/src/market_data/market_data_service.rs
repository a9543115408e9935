use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::Serialize;

use crate::indicators::{
    atr, bollinger, classify_trend, macd, percent_change, pivot_points, rsi, sma,
    support_resistance, Trend,
};
use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{CompanyProfile, Quote};
use crate::market_data::providers::ProviderRegistry;

const HISTORY_DAYS: i64 = 365;
const SUPPORT_RESISTANCE_WINDOW: usize = 90;
const VOLUME_WINDOW: usize = 30;

/// Which provider served each part of a snapshot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DataProviders {
    pub quotes: String,
    pub profile: Option<String>,
}

/// Full technical and fundamental snapshot for the advisory flow.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorData {
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: String,

    pub current_price: f64,
    pub avg_volume_30d: f64,
    pub current_volume: f64,
    pub volume_ratio: f64,

    pub price_change_1d: Option<f64>,
    pub price_change_5d: Option<f64>,
    pub price_change_1m: Option<f64>,

    pub rsi: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,

    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,

    pub atr: Option<f64>,

    pub support_level: f64,
    pub resistance_level: f64,
    pub pivot_point: f64,
    pub support_1: f64,
    pub resistance_1: f64,

    pub trend: Trend,

    pub target_mean_price: Option<f64>,
    pub target_high_price: Option<f64>,
    pub target_low_price: Option<f64>,
    pub recommendation_key: Option<String>,
    pub number_of_analysts: Option<u32>,
    pub upside_potential: Option<f64>,

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

    pub data_timestamp: DateTime<Utc>,
    pub historical_days: usize,
    pub data_providers: DataProviders,
}

/// Fundamentals-oriented snapshot for the analysis flow.
#[derive(Debug, Clone, Serialize)]
pub struct CompanySnapshot {
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: String,

    pub current_price: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
    pub avg_volume: f64,

    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub profit_margins: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub beta: Option<f64>,

    pub fetched_at: DateTime<Utc>,
    pub data_providers: DataProviders,
}

/// Fetches a year of history plus reference data through the provider
/// registry and derives the indicator set the report engines consume.
pub struct AdvisorDataService {
    registry: Arc<ProviderRegistry>,
}

impl AdvisorDataService {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        AdvisorDataService { registry }
    }

    pub async fn get_advisor_data(&self, ticker: &str) -> Result<AdvisorData, MarketDataError> {
        let end = Utc::now();
        let start = end - Duration::days(HISTORY_DAYS);

        let history = self.registry.historical_quotes(ticker, start, end).await?;
        let (profile, profile_provider) = self.fetch_profile_best_effort(ticker).await;

        let providers = DataProviders {
            quotes: history.provider,
            profile: profile_provider,
        };

        build_advisor_data(ticker, &history.payload, &profile, providers)
    }

    pub async fn company_snapshot(&self, ticker: &str) -> Result<CompanySnapshot, MarketDataError> {
        let end = Utc::now();
        let start = end - Duration::days(HISTORY_DAYS);

        let history = self.registry.historical_quotes(ticker, start, end).await?;
        let (profile, profile_provider) = self.fetch_profile_best_effort(ticker).await;

        let providers = DataProviders {
            quotes: history.provider,
            profile: profile_provider,
        };

        build_company_snapshot(ticker, &history.payload, &profile, providers)
    }

    /// Reference data is best effort: Polygon serves no profiles and Alpha
    /// Vantage has no overview for most ETFs, so a miss here must not sink
    /// the whole request.
    async fn fetch_profile_best_effort(&self, ticker: &str) -> (CompanyProfile, Option<String>) {
        match self.registry.company_profile(ticker).await {
            Ok(resolved) => (resolved.payload, Some(resolved.provider)),
            Err(e) => {
                warn!("No company profile available for {}: {}", ticker, e);
                (
                    CompanyProfile {
                        symbol: ticker.to_string(),
                        ..Default::default()
                    },
                    None,
                )
            }
        }
    }
}

fn build_advisor_data(
    ticker: &str,
    quotes: &[Quote],
    profile: &CompanyProfile,
    providers: DataProviders,
) -> Result<AdvisorData, MarketDataError> {
    let latest = quotes
        .last()
        .ok_or_else(|| MarketDataError::NotFound(format!("No historical data for {}", ticker)))?;

    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let highs: Vec<f64> = quotes.iter().map(|q| q.high).collect();
    let lows: Vec<f64> = quotes.iter().map(|q| q.low).collect();
    let volumes: Vec<f64> = quotes.iter().map(|q| q.volume).collect();

    let current_price = latest.close;
    let current_volume = latest.volume;

    let volume_start = volumes.len().saturating_sub(VOLUME_WINDOW);
    let volume_window = &volumes[volume_start..];
    let avg_volume_30d = volume_window.iter().sum::<f64>() / volume_window.len() as f64;
    let volume_ratio = if avg_volume_30d > 0.0 {
        current_volume / avg_volume_30d
    } else {
        1.0
    };

    let sma_50 = sma(&closes, 50);
    let sma_200 = sma(&closes, 200);
    let macd_values = macd(&closes, 12, 26, 9);
    let bands = bollinger(&closes, 20, 2.0);

    let (support_level, resistance_level) =
        support_resistance(&highs, &lows, SUPPORT_RESISTANCE_WINDOW).ok_or_else(|| {
            MarketDataError::NotFound(format!("No historical data for {}", ticker))
        })?;
    let pivots = pivot_points(resistance_level, support_level, current_price);

    let upside_potential = profile.target_mean_price.and_then(|target| {
        if current_price > 0.0 {
            Some((target - current_price) / current_price * 100.0)
        } else {
            None
        }
    });

    Ok(AdvisorData {
        ticker: ticker.to_string(),
        name: profile.name.clone(),
        sector: profile.sector.clone(),
        industry: profile.industry.clone(),
        currency: profile
            .currency
            .clone()
            .unwrap_or_else(|| latest.currency.clone()),

        current_price,
        avg_volume_30d,
        current_volume,
        volume_ratio,

        price_change_1d: percent_change(&closes, 1),
        price_change_5d: percent_change(&closes, 5),
        price_change_1m: percent_change(&closes, 21),

        rsi: rsi(&closes, 14),
        sma_50,
        sma_200,
        macd: macd_values.map(|m| m.macd),
        macd_signal: macd_values.map(|m| m.signal),
        macd_histogram: macd_values.map(|m| m.histogram),

        bb_upper: bands.map(|b| b.upper),
        bb_middle: bands.map(|b| b.middle),
        bb_lower: bands.map(|b| b.lower),

        atr: atr(&highs, &lows, &closes, 14),

        support_level,
        resistance_level,
        pivot_point: pivots.pivot,
        support_1: pivots.support_1,
        resistance_1: pivots.resistance_1,

        trend: classify_trend(current_price, sma_50, sma_200),

        target_mean_price: profile.target_mean_price,
        target_high_price: profile.target_high_price,
        target_low_price: profile.target_low_price,
        recommendation_key: profile.recommendation_key.clone(),
        number_of_analysts: profile.number_of_analysts,
        upside_potential,

        forward_pe: profile.forward_pe,
        trailing_pe: profile.trailing_pe,
        peg_ratio: profile.peg_ratio,
        debt_to_equity: profile.debt_to_equity,
        price_to_book: profile.price_to_book,
        profit_margins: profile.profit_margins,
        revenue_growth: profile.revenue_growth,
        earnings_growth: profile.earnings_growth,
        market_cap: profile.market_cap,
        beta: profile.beta,

        data_timestamp: Utc::now(),
        historical_days: quotes.len(),
        data_providers: providers,
    })
}

fn build_company_snapshot(
    ticker: &str,
    quotes: &[Quote],
    profile: &CompanyProfile,
    providers: DataProviders,
) -> Result<CompanySnapshot, MarketDataError> {
    let latest = quotes
        .last()
        .ok_or_else(|| MarketDataError::NotFound(format!("No historical data for {}", ticker)))?;

    let week_52_high = quotes.iter().map(|q| q.high).fold(f64::MIN, f64::max);
    let week_52_low = quotes.iter().map(|q| q.low).fold(f64::MAX, f64::min);
    let avg_volume = quotes.iter().map(|q| q.volume).sum::<f64>() / quotes.len() as f64;

    Ok(CompanySnapshot {
        ticker: ticker.to_string(),
        name: profile.name.clone(),
        sector: profile.sector.clone(),
        industry: profile.industry.clone(),
        currency: profile
            .currency
            .clone()
            .unwrap_or_else(|| latest.currency.clone()),

        current_price: latest.close,
        week_52_high,
        week_52_low,
        avg_volume,

        market_cap: profile.market_cap,
        trailing_pe: profile.trailing_pe,
        forward_pe: profile.forward_pe,
        peg_ratio: profile.peg_ratio,
        price_to_book: profile.price_to_book,
        debt_to_equity: profile.debt_to_equity,
        profit_margins: profile.profit_margins,
        revenue_growth: profile.revenue_growth,
        earnings_growth: profile.earnings_growth,
        beta: profile.beta,

        fetched_at: Utc::now(),
        data_providers: providers,
    })
}
