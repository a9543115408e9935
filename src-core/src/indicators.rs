//! Technical indicator math over daily OHLCV series.
//!
//! All functions operate on plain `f64` slices ordered oldest-first and
//! return `None` when the series is too short for the requested window.

use serde::Serialize;

/// Simple moving average over the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Exponential moving average series with an SMA seed and the standard
/// smoothing factor `2 / (period + 1)`. The first element corresponds to
/// index `period - 1` of the input.
fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut ema = seed;
    for value in &values[period..] {
        ema = (value - ema) * k + ema;
        out.push(ema);
    }
    out
}

/// Relative Strength Index using Wilder's smoothing. Needs at least
/// `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = deltas[..period].iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss = deltas[..period].iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>()
        / period as f64;

    for delta in &deltas[period..] {
        let (gain, loss) = if *delta > 0.0 { (*delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD with the conventional 12/26/9 windows. Needs at least
/// `slow + signal - 1` closes (34 for the defaults).
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    if fast == 0 || slow <= fast || signal == 0 || closes.len() < slow + signal - 1 {
        return None;
    }
    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);
    // The fast series starts earlier; align both on the slow series.
    let offset = fast_ema.len() - slow_ema.len();
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, s)| fast_ema[i + offset] - s)
        .collect();
    let signal_line = ema_series(&macd_line, signal);
    let macd_value = *macd_line.last()?;
    let signal_value = *signal_line.last()?;
    Some(Macd {
        macd: macd_value,
        signal: signal_value,
        histogram: macd_value - signal_value,
    })
}

/// Bollinger bands around the 20-day SMA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn bollinger(closes: &[f64], period: usize, width: f64) -> Option<Bollinger> {
    let middle = sma(closes, period)?;
    let window = &closes[closes.len() - period..];
    let variance =
        window.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();
    Some(Bollinger {
        upper: middle + width * std_dev,
        middle,
        lower: middle - width * std_dev,
    })
}

/// Average True Range with Wilder's smoothing. Needs at least `period + 1`
/// bars, since the true range of a bar uses the previous close.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    let len = closes.len();
    if period == 0 || len <= period || highs.len() != len || lows.len() != len {
        return None;
    }
    let true_ranges: Vec<f64> = (1..len)
        .map(|i| {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let mut atr = true_ranges[..period].iter().sum::<f64>() / period as f64;
    for tr in &true_ranges[period..] {
        atr = (atr * (period as f64 - 1.0) + tr) / period as f64;
    }
    Some(atr)
}

/// Support and resistance as the extremes over the trailing `window` bars
/// (the full series if shorter).
pub fn support_resistance(highs: &[f64], lows: &[f64], window: usize) -> Option<(f64, f64)> {
    if highs.is_empty() || lows.is_empty() {
        return None;
    }
    let h_start = highs.len().saturating_sub(window);
    let l_start = lows.len().saturating_sub(window);
    let resistance = highs[h_start..].iter().copied().fold(f64::MIN, f64::max);
    let support = lows[l_start..].iter().copied().fold(f64::MAX, f64::min);
    Some((support, resistance))
}

/// Classic floor-trader pivot levels from a period's high, low and close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub resistance_1: f64,
    pub support_1: f64,
}

pub fn pivot_points(high: f64, low: f64, close: f64) -> PivotPoints {
    let pivot = (high + low + close) / 3.0;
    PivotPoints {
        pivot,
        resistance_1: 2.0 * pivot - low,
        support_1: 2.0 * pivot - high,
    }
}

/// Market regime derived from the 50/200-day SMA cross and the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    StrongUptrend,
    Uptrend,
    Neutral,
    Downtrend,
    StrongDowntrend,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::StrongUptrend => "STRONG_UPTREND",
            Trend::Uptrend => "UPTREND",
            Trend::Neutral => "NEUTRAL",
            Trend::Downtrend => "DOWNTREND",
            Trend::StrongDowntrend => "STRONG_DOWNTREND",
        }
    }
}

/// Classify the trend; neutral when either SMA is unavailable.
pub fn classify_trend(price: f64, sma_50: Option<f64>, sma_200: Option<f64>) -> Trend {
    match (sma_50, sma_200) {
        (Some(short), Some(long)) => {
            if short > long && price > short {
                Trend::StrongUptrend
            } else if short > long {
                Trend::Uptrend
            } else if short < long && price < short {
                Trend::StrongDowntrend
            } else if short < long {
                Trend::Downtrend
            } else {
                Trend::Neutral
            }
        }
        _ => Trend::Neutral,
    }
}

/// Percent change between the latest close and the close `bars_back` bars
/// earlier (1 = previous session, 5 = one trading week, 21 = one month).
pub fn percent_change(closes: &[f64], bars_back: usize) -> Option<f64> {
    if closes.len() <= bars_back {
        return None;
    }
    let latest = *closes.last()?;
    let past = closes[closes.len() - 1 - bars_back];
    if past == 0.0 {
        return None;
    }
    Some((latest - past) / past * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sma_averages_trailing_window() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_close(sma(&closes, 3).unwrap(), 4.0, 1e-10);
        assert_close(sma(&closes, 5).unwrap(), 3.0, 1e-10);
        assert!(sma(&closes, 6).is_none());
        assert!(sma(&closes, 0).is_none());
    }

    #[test]
    fn ema_seeds_with_sma() {
        let values = [2.0, 4.0, 6.0, 8.0];
        let series = ema_series(&values, 3);
        // Seed = 4.0, then (8 - 4) * 0.5 + 4 = 6.0.
        assert_eq!(series.len(), 2);
        assert_close(series[0], 4.0, 1e-10);
        assert_close(series[1], 6.0, 1e-10);
    }

    #[test]
    fn rsi_of_monotonic_series_is_saturated() {
        let rising: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert_close(rsi(&rising, 14).unwrap(), 100.0, 1e-10);

        let falling: Vec<f64> = (1..=20).rev().map(|i| i as f64).collect();
        assert_close(rsi(&falling, 14).unwrap(), 0.0, 1e-10);
    }

    #[test]
    fn rsi_mixed_series_is_in_range() {
        let closes = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89,
            46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ];
        let value = rsi(&closes, 14).unwrap();
        assert!(value > 0.0 && value < 100.0);
        // Well-known worked example for this series lands near 62 after
        // Wilder smoothing through the extra bars.
        assert!(value > 50.0 && value < 75.0);
    }

    #[test]
    fn rsi_requires_period_plus_one_closes() {
        let closes = [1.0; 14];
        assert!(rsi(&closes, 14).is_none());
    }

    #[test]
    fn macd_of_flat_series_is_zero() {
        let closes = [100.0; 60];
        let m = macd(&closes, 12, 26, 9).unwrap();
        assert_close(m.macd, 0.0, 1e-10);
        assert_close(m.signal, 0.0, 1e-10);
        assert_close(m.histogram, 0.0, 1e-10);
    }

    #[test]
    fn macd_is_positive_in_an_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let m = macd(&closes, 12, 26, 9).unwrap();
        assert!(m.macd > 0.0);
    }

    #[test]
    fn macd_needs_enough_history() {
        let closes = [1.0; 33];
        assert!(macd(&closes, 12, 26, 9).is_none());
    }

    #[test]
    fn bollinger_bands_bracket_the_mean() {
        let closes: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 10.0 } else { 12.0 }).collect();
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        assert_close(bands.middle, 11.0, 1e-10);
        // Population std dev of alternating 10/12 is exactly 1.
        assert_close(bands.upper, 13.0, 1e-10);
        assert_close(bands.lower, 9.0, 1e-10);
    }

    #[test]
    fn atr_of_constant_range_bars() {
        let highs = [11.0; 20];
        let lows = [9.0; 20];
        let closes = [10.0; 20];
        assert_close(atr(&highs, &lows, &closes, 14).unwrap(), 2.0, 1e-10);
    }

    #[test]
    fn atr_uses_gaps_against_previous_close() {
        // Second bar gaps up: TR = max(1, |21-10|, |19-10|) = 11.
        let highs = [11.0, 21.0];
        let lows = [9.0, 20.0];
        let closes = [10.0, 20.5];
        assert_close(atr(&highs, &lows, &closes, 1).unwrap(), 11.0, 1e-10);
    }

    #[test]
    fn support_resistance_over_trailing_window() {
        let highs = [50.0, 10.0, 11.0, 12.0];
        let lows = [1.0, 8.0, 7.0, 9.0];
        // Window of 3 excludes the first bar's extremes.
        let (support, resistance) = support_resistance(&highs, &lows, 3).unwrap();
        assert_close(support, 7.0, 1e-10);
        assert_close(resistance, 12.0, 1e-10);
        // A window longer than the series uses everything.
        let (support, resistance) = support_resistance(&highs, &lows, 90).unwrap();
        assert_close(support, 1.0, 1e-10);
        assert_close(resistance, 50.0, 1e-10);
    }

    #[test]
    fn pivot_levels_from_high_low_close() {
        let p = pivot_points(12.0, 6.0, 9.0);
        assert_close(p.pivot, 9.0, 1e-10);
        assert_close(p.resistance_1, 12.0, 1e-10);
        assert_close(p.support_1, 6.0, 1e-10);
    }

    #[test]
    fn trend_classification_covers_all_regimes() {
        assert_eq!(classify_trend(110.0, Some(105.0), Some(100.0)), Trend::StrongUptrend);
        assert_eq!(classify_trend(100.0, Some(105.0), Some(100.1)), Trend::Uptrend);
        assert_eq!(classify_trend(90.0, Some(95.0), Some(100.0)), Trend::StrongDowntrend);
        assert_eq!(classify_trend(96.0, Some(95.0), Some(100.0)), Trend::Downtrend);
        assert_eq!(classify_trend(100.0, None, Some(100.0)), Trend::Neutral);
        assert_eq!(classify_trend(100.0, Some(100.0), Some(100.0)), Trend::Neutral);
    }

    #[test]
    fn percent_change_looks_back_n_bars() {
        let closes = [100.0, 110.0, 121.0];
        assert_close(percent_change(&closes, 1).unwrap(), 10.0, 1e-10);
        assert_close(percent_change(&closes, 2).unwrap(), 21.0, 1e-10);
        assert!(percent_change(&closes, 3).is_none());
    }

    #[test]
    fn trend_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&Trend::StrongUptrend).unwrap();
        assert_eq!(json, "\"STRONG_UPTREND\"");
        assert_eq!(Trend::StrongDowntrend.as_str(), "STRONG_DOWNTREND");
    }
}
