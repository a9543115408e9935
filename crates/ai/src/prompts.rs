//! System prompts and prompt rendering for the two report flows.
//!
//! Missing data is rendered as "N/A" and the prompts instruct the model to
//! acknowledge gaps instead of inventing numbers.

use advisor_core::market_data::{AdvisorData, CompanySnapshot};

/// Senior equity analyst persona for the fundamentals report.
pub const ANALYST_SYSTEM_PROMPT: &str = "\
You are a Senior Equity Analyst at a prestigious investment firm with 15+ years of experience in fundamental analysis and equity research.

IMPORTANT: You MUST write ALL reports in GERMAN language. Use professional German financial terminology.

Your role is to provide professional, critical, and data-driven investment analysis. Your tone must be:
- Professional and objective
- Analytical and evidence-based
- Critical where warranted (identify both opportunities and risks)
- Direct and concise
- Free from promotional language or unfounded optimism

You analyze companies through multiple lenses:
1. Fundamental valuation (P/E, P/B, margins, growth rates)
2. Financial health (balance sheet strength, debt levels, cash flow)
3. Competitive positioning and industry dynamics
4. Risk factors and potential challenges
5. Market sentiment and recent developments

Your reports must be structured, well-reasoned, and useful for institutional investors making allocation decisions. Remember: Write everything in German.";

/// Chief investment advisor persona for the trading advisory.
pub const ADVISOR_SYSTEM_PROMPT: &str = "\
You are the Chief Investment Advisor at a quantitative hedge fund.

Your expertise combines:
- Deep technical analysis (RSI, MACD, Moving Averages, Support/Resistance)
- Fundamental valuation (P/E ratios, PEG, Debt levels)
- Risk management (Stop-loss placement, position sizing)
- Wall Street consensus interpretation

Your communication style:
- PRECISE: No vague statements like \"could be interesting\"
- RISK-AWARE: Always highlight downside scenarios
- ACTION-ORIENTED: Every analysis must end with a clear action
- HONEST: If data is insufficient or conflicting, say so

Critical Rules:
1. If RSI > 70, NEVER recommend immediate market buy - wait for pullback
2. If RSI < 30 and trend is down, warn about \"falling knife\" risk
3. Stop-loss must always be set 3-5% below recent support
4. If Wall Street consensus conflicts with technicals, explain the divergence
5. No position should be taken without a clear entry zone and exit plan

You hate:
- Generic phrases like \"do your own research\"
- Analyses without specific price levels
- Recommendations without risk management

You must always provide specific numbers: entry prices, target prices, stop-losses.";

/// Render an `f64` with two decimals, "N/A" when absent.
fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}

fn fmt_opt_precise(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.4}", v))
}

/// Large monetary values with T/B/M suffixes.
fn fmt_money(value: Option<f64>) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) if v >= 1e12 => format!("${:.2}T", v / 1e12),
        Some(v) if v >= 1e9 => format!("${:.2}B", v / 1e9),
        Some(v) if v >= 1e6 => format!("${:.2}M", v / 1e6),
        Some(v) => format!("${:.2}", v),
    }
}

/// Ratio as a percentage (0.15 renders as "15.00%").
fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn fmt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn rsi_status(rsi: Option<f64>) -> &'static str {
    match rsi {
        Some(v) if v > 70.0 => "OVERBOUGHT (>70)",
        Some(v) if v < 30.0 => "OVERSOLD (<30)",
        Some(_) => "NEUTRAL",
        None => "UNKNOWN",
    }
}

fn macd_status(histogram: Option<f64>) -> &'static str {
    match histogram {
        Some(v) if v > 0.0 => "BULLISH",
        Some(_) => "BEARISH",
        None => "UNKNOWN",
    }
}

fn bollinger_position(price: f64, upper: Option<f64>, lower: Option<f64>) -> &'static str {
    match (upper, lower) {
        (Some(upper), _) if price > upper => "ABOVE upper band (overbought zone)",
        (_, Some(lower)) if price < lower => "BELOW lower band (oversold zone)",
        (Some(_), Some(_)) => "WITHIN bands (normal range)",
        _ => "UNKNOWN",
    }
}

/// Percent distance between price and a level, relative to price.
fn distance_pct(from: f64, to: f64) -> String {
    if from == 0.0 {
        return "N/A".to_string();
    }
    format!("{:.2}%", (to / from * 100.0).abs())
}

fn pct_vs(price: f64, level: Option<f64>) -> String {
    match level {
        Some(level) if level != 0.0 => format!("{:+.2}%", (price - level) / level * 100.0),
        _ => "N/A".to_string(),
    }
}

/// Build the user prompt for the fundamentals-oriented investment report.
pub fn render_analysis_prompt(snapshot: &CompanySnapshot) -> String {
    let name = snapshot.name.as_deref().unwrap_or(&snapshot.ticker);

    format!(
        "Generate a comprehensive investment report for the following security:

**Ticker:** {ticker}
**Company Name:** {name}
**Sector:** {sector}
**Industry:** {industry}

## Market Data
- Current Price: {price:.2} {currency}
- Market Cap: {market_cap}
- P/E Ratio (Trailing): {trailing_pe}
- Forward P/E: {forward_pe}
- PEG Ratio: {peg_ratio}
- Price/Book: {price_to_book}
- Beta: {beta}
- 52-Week Range: {week_low:.2} - {week_high:.2}
- Average Daily Volume (1Y): {avg_volume:.0}

## Financial Metrics
- Profit Margins: {profit_margins}
- Revenue Growth: {revenue_growth}
- Earnings Growth: {earnings_growth}
- Debt to Equity: {debt_to_equity}

---

Please generate a professional investment report in **Markdown format** with the following structure:

# Investment Analysis: {name} ({ticker})

## Executive Summary
A concise 3-4 sentence overview covering: current valuation assessment, key investment thesis, and overall recommendation direction.

## Company Overview
Brief description of the business, sector positioning, and competitive landscape.

## Fundamental Analysis

### Valuation Metrics
Analysis of P/E ratio, market cap, and relative valuation compared to sector/peers.

### Financial Health
Assessment of balance sheet strength, debt levels, liquidity, and financial stability.

### Profitability & Growth
Analysis of margins, revenue growth, and earnings trajectory.

## Investment Thesis

### Bull Case
3-5 key positive factors and growth catalysts. Be specific and data-driven.

### Bear Case
3-5 key risks, challenges, and potential headwinds. Be critical and realistic.

## Conclusion
Final assessment synthesizing the analysis. Include a directional view (e.g., \"Attractive for long-term growth investors\" or \"Overvalued at current levels\").

## 🎯 Recommendation

End with a clear, actionable recommendation box:
- **Rating:** One of: STRONG BUY | BUY | HOLD | SELL | STRONG SELL
- **Action:** What should the investor do right now? (e.g., \"Accumulate on dips below $X\", \"Wait for better entry\", \"Take profits\", \"Avoid\")
- **Target Price:** If possible, suggest a fair value or target price range based on valuation metrics
- **Risk Level:** LOW | MEDIUM | HIGH | VERY HIGH

---

**Important Instructions:**
- Use actual data from above; if data is \"N/A\", acknowledge the limitation
- Be critical and balanced; avoid promotional language
- Format all numbers clearly (use M for millions, B for billions)
- Keep the report to 600-800 words
- Use professional financial analysis terminology
- Provide specific, actionable insights
- The final recommendation MUST be clear and decisive",
        ticker = snapshot.ticker,
        name = name,
        sector = fmt_str(&snapshot.sector),
        industry = fmt_str(&snapshot.industry),
        price = snapshot.current_price,
        currency = snapshot.currency,
        market_cap = fmt_money(snapshot.market_cap),
        trailing_pe = fmt_opt(snapshot.trailing_pe),
        forward_pe = fmt_opt(snapshot.forward_pe),
        peg_ratio = fmt_opt(snapshot.peg_ratio),
        price_to_book = fmt_opt(snapshot.price_to_book),
        beta = fmt_opt(snapshot.beta),
        week_low = snapshot.week_52_low,
        week_high = snapshot.week_52_high,
        avg_volume = snapshot.avg_volume,
        profit_margins = fmt_pct(snapshot.profit_margins),
        revenue_growth = fmt_pct(snapshot.revenue_growth),
        earnings_growth = fmt_pct(snapshot.earnings_growth),
        debt_to_equity = fmt_opt(snapshot.debt_to_equity),
    )
}

/// Build the user prompt for the technicals-driven trading advisory.
pub fn render_advisory_prompt(data: &AdvisorData) -> String {
    let name = data.name.as_deref().unwrap_or(&data.ticker);
    let price = data.current_price;

    let distance_to_support = distance_pct(price, price - data.support_level);
    let distance_to_resistance = distance_pct(price, data.resistance_level - price);

    let recommendation = data
        .recommendation_key
        .as_deref()
        .unwrap_or("none")
        .to_uppercase();

    format!(
        "Analyze the following security and provide an actionable trading recommendation.

TICKER: {ticker}
COMPANY: {name}
SECTOR: {sector}

=== CURRENT MARKET DATA ===
Current Price: {price:.2} {currency}
1-Day Change: {change_1d}%
5-Day Change: {change_5d}%
1-Month Change: {change_1m}%
Volume Ratio: {volume_ratio:.2}x (current vs 30-day avg)

=== TECHNICAL INDICATORS ===
RSI(14): {rsi}
  Status: {rsi_status}

Trend: {trend}
SMA 50: {sma_50}
SMA 200: {sma_200}
Price vs SMA50: {price_vs_sma50}
Price vs SMA200: {price_vs_sma200}

MACD: {macd}
MACD Signal: {macd_signal}
MACD Histogram: {macd_histogram}
MACD Status: {macd_status}

Bollinger Bands:
- Upper: {bb_upper}
- Middle: {bb_middle}
- Lower: {bb_lower}
- Position: {bb_position}

ATR(14): {atr}

=== SUPPORT & RESISTANCE (Critical Price Zones) ===
Support Level (90d low): {support:.2}
Resistance Level (90d high): {resistance:.2}
Pivot Point: {pivot:.2}
S1: {support_1:.2}
R1: {resistance_1:.2}

Distance to Support: {distance_to_support}
Distance to Resistance: {distance_to_resistance}

=== WALL STREET CONSENSUS ===
Analyst Recommendation: {recommendation}
Number of Analysts: {analysts}
Target Price (Mean): {target_mean}
Target High: {target_high}
Target Low: {target_low}
Implied Upside: {upside}%

=== FUNDAMENTAL VALUATION ===
Forward P/E: {forward_pe}
Trailing P/E: {trailing_pe}
PEG Ratio: {peg_ratio}
Price/Book: {price_to_book}
Debt/Equity: {debt_to_equity}

Profitability:
- Profit Margin: {profit_margins}
- Revenue Growth: {revenue_growth}
- Earnings Growth: {earnings_growth}

Market Cap: {market_cap}
Beta: {beta}

---

Generate a comprehensive trading advisory report in Markdown format with the following structure:

# Trading Advisory: {name} ({ticker})

## Executive Summary
Provide a 2-3 sentence summary of the current situation and your recommendation.

## Technical Analysis Assessment

### Momentum & Trend
Analyze RSI, MACD, and trend indicators. Is momentum bullish or bearish?

### Price Action
Discuss the current price relative to moving averages and support/resistance levels.

### Volume Analysis
Interpret the volume ratio and what it signals about conviction.

## Fundamental Perspective

### Valuation Analysis
Is the stock cheap, fair, or expensive based on P/E, PEG, and other metrics?

### Financial Health
Assess debt levels, profitability, and growth rates.

## Wall Street vs Technicals
Compare analyst consensus with what the charts are saying. Any divergence?

## Risk Factors
List 3-4 specific risks for this position right now.

---

## 🎯 ADVISOR ACTION CARD

**RECOMMENDATION:** [KAUFEN / HALTEN / VERKAUFEN / WATCHLIST]

**ENTRY ZONE:**
€ [X.XX] - € [Y.YY]
_Rationale: [Why these specific prices]_

**PRICE TARGET (12M):**
€ [Z.ZZ]
_Basis: [Analyst consensus / Technical projection / Valuation model]_

**STOP-LOSS:**
€ [A.AA] (-X.X%)
_Logic: 3-5% below support at € {support:.2}_

**POSITION SIZE GUIDANCE:**
[Small / Medium / Large] position (X-Y% of portfolio)

**KEY TRIGGERS:**
- ✅ Entry Signal: [Specific condition, e.g., \"RSI drops below 50 + price above SMA50\"]
- 🚨 Exit Signal: [Specific condition, e.g., \"Break below support\"]

**TIMEFRAME:** [Days / Weeks / Months]

---

## Analyst Notes
Any additional context or nuance that doesn't fit above.

---

**Disclaimer:** This analysis is for informational purposes only. Markets are inherently risky.",
        ticker = data.ticker,
        name = name,
        sector = fmt_str(&data.sector),
        price = price,
        currency = data.currency,
        change_1d = fmt_opt(data.price_change_1d),
        change_5d = fmt_opt(data.price_change_5d),
        change_1m = fmt_opt(data.price_change_1m),
        volume_ratio = data.volume_ratio,
        rsi = fmt_opt(data.rsi),
        rsi_status = rsi_status(data.rsi),
        trend = data.trend.as_str(),
        sma_50 = fmt_opt(data.sma_50),
        sma_200 = fmt_opt(data.sma_200),
        price_vs_sma50 = pct_vs(price, data.sma_50),
        price_vs_sma200 = pct_vs(price, data.sma_200),
        macd = fmt_opt_precise(data.macd),
        macd_signal = fmt_opt_precise(data.macd_signal),
        macd_histogram = fmt_opt_precise(data.macd_histogram),
        macd_status = macd_status(data.macd_histogram),
        bb_upper = fmt_opt(data.bb_upper),
        bb_middle = fmt_opt(data.bb_middle),
        bb_lower = fmt_opt(data.bb_lower),
        bb_position = bollinger_position(price, data.bb_upper, data.bb_lower),
        atr = fmt_opt(data.atr),
        support = data.support_level,
        resistance = data.resistance_level,
        pivot = data.pivot_point,
        support_1 = data.support_1,
        resistance_1 = data.resistance_1,
        distance_to_support = distance_to_support,
        distance_to_resistance = distance_to_resistance,
        recommendation = recommendation,
        analysts = data.number_of_analysts.unwrap_or(0),
        target_mean = fmt_opt(data.target_mean_price),
        target_high = fmt_opt(data.target_high_price),
        target_low = fmt_opt(data.target_low_price),
        upside = fmt_opt(data.upside_potential),
        forward_pe = fmt_opt(data.forward_pe),
        trailing_pe = fmt_opt(data.trailing_pe),
        peg_ratio = fmt_opt(data.peg_ratio),
        price_to_book = fmt_opt(data.price_to_book),
        debt_to_equity = fmt_opt(data.debt_to_equity),
        profit_margins = fmt_pct(data.profit_margins),
        revenue_growth = fmt_pct(data.revenue_growth),
        earnings_growth = fmt_pct(data.earnings_growth),
        market_cap = fmt_money(data.market_cap),
        beta = fmt_opt(data.beta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::indicators::Trend;
    use advisor_core::market_data::DataProviders;
    use chrono::Utc;

    fn sample_advisor_data() -> AdvisorData {
        AdvisorData {
            ticker: "NVDA".to_string(),
            name: Some("NVIDIA Corporation".to_string()),
            sector: Some("Technology".to_string()),
            industry: Some("Semiconductors".to_string()),
            currency: "USD".to_string(),
            current_price: 131.5,
            avg_volume_30d: 180_000_000.0,
            current_volume: 200_000_000.0,
            volume_ratio: 1.11,
            price_change_1d: Some(1.2),
            price_change_5d: Some(4.5),
            price_change_1m: Some(9.8),
            rsi: Some(72.4),
            sma_50: Some(120.0),
            sma_200: Some(100.0),
            macd: Some(2.1234),
            macd_signal: Some(1.8),
            macd_histogram: Some(0.3234),
            bb_upper: Some(135.0),
            bb_middle: Some(125.0),
            bb_lower: Some(115.0),
            atr: Some(4.2),
            support_level: 110.0,
            resistance_level: 140.0,
            pivot_point: 127.17,
            support_1: 114.33,
            resistance_1: 144.33,
            trend: Trend::StrongUptrend,
            target_mean_price: Some(160.0),
            target_high_price: Some(200.0),
            target_low_price: Some(120.0),
            recommendation_key: Some("buy".to_string()),
            number_of_analysts: Some(45),
            upside_potential: Some(21.67),
            forward_pe: Some(32.0),
            trailing_pe: Some(55.0),
            peg_ratio: Some(1.1),
            debt_to_equity: Some(17.2),
            price_to_book: Some(48.0),
            profit_margins: Some(0.55),
            revenue_growth: Some(0.94),
            earnings_growth: Some(1.2),
            market_cap: Some(3.2e12),
            beta: Some(1.7),
            data_timestamp: Utc::now(),
            historical_days: 250,
            data_providers: DataProviders {
                quotes: "YAHOO".to_string(),
                profile: Some("YAHOO".to_string()),
            },
        }
    }

    #[test]
    fn advisory_prompt_derives_statuses() {
        let prompt = render_advisory_prompt(&sample_advisor_data());
        assert!(prompt.contains("TICKER: NVDA"));
        assert!(prompt.contains("Status: OVERBOUGHT (>70)"));
        assert!(prompt.contains("MACD Status: BULLISH"));
        assert!(prompt.contains("Position: WITHIN bands (normal range)"));
        assert!(prompt.contains("Trend: STRONG_UPTREND"));
        assert!(prompt.contains("Market Cap: $3.20T"));
        assert!(prompt.contains("Analyst Recommendation: BUY"));
        assert!(prompt.contains("Profit Margin: 55.00%"));
    }

    #[test]
    fn advisory_prompt_handles_missing_indicators() {
        let mut data = sample_advisor_data();
        data.rsi = None;
        data.macd_histogram = None;
        data.bb_upper = None;
        data.bb_lower = None;
        data.market_cap = None;
        data.recommendation_key = None;

        let prompt = render_advisory_prompt(&data);
        assert!(prompt.contains("RSI(14): N/A"));
        assert!(prompt.contains("Status: UNKNOWN"));
        assert!(prompt.contains("MACD Status: UNKNOWN"));
        assert!(prompt.contains("Market Cap: N/A"));
        assert!(prompt.contains("Analyst Recommendation: NONE"));
    }

    #[test]
    fn analysis_prompt_formats_fundamentals() {
        let snapshot = CompanySnapshot {
            ticker: "AAPL".to_string(),
            name: Some("Apple Inc.".to_string()),
            sector: Some("Technology".to_string()),
            industry: Some("Consumer Electronics".to_string()),
            currency: "USD".to_string(),
            current_price: 230.1,
            week_52_high: 245.0,
            week_52_low: 164.0,
            avg_volume: 52_000_000.0,
            market_cap: Some(3.5e12),
            trailing_pe: Some(35.2),
            forward_pe: Some(28.9),
            peg_ratio: Some(2.1),
            price_to_book: Some(48.5),
            debt_to_equity: Some(145.0),
            profit_margins: Some(0.26),
            revenue_growth: Some(0.05),
            earnings_growth: None,
            beta: Some(1.2),
            fetched_at: Utc::now(),
            data_providers: DataProviders {
                quotes: "YAHOO".to_string(),
                profile: Some("YAHOO".to_string()),
            },
        };

        let prompt = render_analysis_prompt(&snapshot);
        assert!(prompt.contains("**Ticker:** AAPL"));
        assert!(prompt.contains("Market Cap: $3.50T"));
        assert!(prompt.contains("52-Week Range: 164.00 - 245.00"));
        assert!(prompt.contains("Profit Margins: 26.00%"));
        assert!(prompt.contains("Earnings Growth: N/A"));
    }

    #[test]
    fn money_formatting_scales_suffixes() {
        assert_eq!(fmt_money(Some(2.5e12)), "$2.50T");
        assert_eq!(fmt_money(Some(910.0e9)), "$910.00B");
        assert_eq!(fmt_money(Some(42.0e6)), "$42.00M");
        assert_eq!(fmt_money(Some(950.0)), "$950.00");
        assert_eq!(fmt_money(None), "N/A");
    }
}
