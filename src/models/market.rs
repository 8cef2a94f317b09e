//! # models::market
//!
//! Per-tick analysis outputs: the indicator snapshot and the classified
//! market state. Both are recomputed from scratch every tick and carry no
//! identity of their own.

use serde::{Deserialize, Serialize};

// ─── Indicators ───────────────────────────────────────────────────────────────

/// MACD line with its (approximated) signal line and histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Bollinger Bands. All zeros while the window is shorter than the period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Every indicator value the classifier and scorer consume for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// RSI(14), always within `[0, 100]`.
    pub rsi: f64,
    pub macd: Macd,
    /// MACD computed on the window *before* the newest close. Used for
    /// crossover detection.
    pub prev_macd: Macd,
    pub bollinger: Bollinger,
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        Self {
            rsi: 50.0,
            macd: Macd::default(),
            prev_macd: Macd::default(),
            bollinger: Bollinger::default(),
        }
    }
}

// ─── Regime ───────────────────────────────────────────────────────────────────

/// Classified market condition. Exactly one holds per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Fewer candles than the classifier needs.
    Loading,
    Ranging,
    TrendingBull,
    TrendingBear,
    VolatileBull,
    VolatileBear,
    HighVolatility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Output of the regime classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub regime: Regime,
    /// `round(100 * max(bull, bear) / (bull + bear))`.
    pub confidence: u8,
    pub trend: Trend,
    pub bull_score: u32,
    pub bear_score: u32,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub ema50: Option<f64>,
}

impl MarketState {
    /// State reported while the window is still warming up.
    pub fn loading() -> Self {
        Self {
            regime: Regime::Loading,
            confidence: 0,
            trend: Trend::Neutral,
            bull_score: 0,
            bear_score: 0,
            ema9: None,
            ema21: None,
            ema50: None,
        }
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::loading()
    }
}
