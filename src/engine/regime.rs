//! # engine::regime
//!
//! **Regime Classifier**: weighs bullish against bearish evidence from the
//! indicators and labels the current market.
//!
//! ```text
//! evidence table ──▶ bull / bear score ──▶ trend dominance? ──▶ volatility? ──▶ RANGING
//! ```
//!
//! Trend dominance is checked before raw volatility, so a strongly one-sided
//! market is never reported as `HIGH_VOLATILITY`.

use crate::engine::indicators::ema;
use crate::models::candle;
use crate::models::{Candle, IndicatorSnapshot, MarketState, Regime, Trend};

/// Candles required before the classifier produces anything but `LOADING`.
pub const MIN_CANDLES: usize = 30;

/// Number of trailing close-to-close changes averaged into the volatility proxy.
const VOL_LOOKBACK: usize = 9;
/// A side must lead by more than this many points to set the trend.
const DOMINANCE_MARGIN: u32 = 2;
const VOLATILE_TREND_THRESHOLD: f64 = 0.008;
const HIGH_VOLATILITY_THRESHOLD: f64 = 0.01;

// ─── Evidence Table ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vote {
    Bull,
    Bear,
    Abstain,
}

/// Everything an evidence rule may look at.
struct Inputs<'a> {
    close: f64,
    ema9: Option<f64>,
    ema21: Option<f64>,
    ema50: Option<f64>,
    indicators: &'a IndicatorSnapshot,
}

struct Evidence {
    weight: u32,
    vote: fn(&Inputs) -> Vote,
}

/// Every EMA comparison votes. A slower average that is still undefined
/// counts as lying below the faster one.
fn above(a: Option<f64>, b: Option<f64>) -> Vote {
    match (a, b) {
        (Some(a), Some(b)) if a > b => Vote::Bull,
        (Some(_), None) => Vote::Bull,
        _ => Vote::Bear,
    }
}

fn fast_over_medium(i: &Inputs) -> Vote {
    above(i.ema9, i.ema21)
}

fn medium_over_slow(i: &Inputs) -> Vote {
    above(i.ema21, i.ema50)
}

fn price_vs_middle_band(i: &Inputs) -> Vote {
    if i.close > i.indicators.bollinger.middle {
        Vote::Bull
    } else {
        Vote::Bear
    }
}

/// 45..=55 is a neutral band that votes for neither side.
fn rsi_zone(i: &Inputs) -> Vote {
    let rsi = i.indicators.rsi;
    if rsi > 55.0 {
        Vote::Bull
    } else if rsi < 45.0 {
        Vote::Bear
    } else {
        Vote::Abstain
    }
}

fn macd_histogram_sign(i: &Inputs) -> Vote {
    if i.indicators.macd.histogram > 0.0 {
        Vote::Bull
    } else {
        Vote::Bear
    }
}

const EVIDENCE: &[Evidence] = &[
    Evidence { weight: 2, vote: fast_over_medium },
    Evidence { weight: 2, vote: medium_over_slow },
    Evidence { weight: 1, vote: price_vs_middle_band },
    Evidence { weight: 1, vote: rsi_zone },
    Evidence { weight: 1, vote: macd_histogram_sign },
];

// ─── Classification ───────────────────────────────────────────────────────────

/// Mean absolute relative change over the last [`VOL_LOOKBACK`] closes.
pub fn average_volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let start = closes.len().saturating_sub(VOL_LOOKBACK + 1);
    let changes: Vec<f64> = closes[start..]
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]).abs() / w[0] })
        .collect();
    changes.iter().sum::<f64>() / changes.len() as f64
}

/// Map the two evidence scores and the volatility proxy to a regime.
pub fn decide(bull_score: u32, bear_score: u32, avg_vol: f64) -> (Regime, Trend) {
    if bull_score > bear_score + DOMINANCE_MARGIN {
        let regime = if avg_vol > VOLATILE_TREND_THRESHOLD {
            Regime::VolatileBull
        } else {
            Regime::TrendingBull
        };
        (regime, Trend::Bullish)
    } else if bear_score > bull_score + DOMINANCE_MARGIN {
        let regime = if avg_vol > VOLATILE_TREND_THRESHOLD {
            Regime::VolatileBear
        } else {
            Regime::TrendingBear
        };
        (regime, Trend::Bearish)
    } else if avg_vol > HIGH_VOLATILITY_THRESHOLD {
        (Regime::HighVolatility, Trend::Neutral)
    } else {
        (Regime::Ranging, Trend::Neutral)
    }
}

/// Classify the market from the candle window and this tick's indicators.
pub fn classify(candles: &[Candle], indicators: &IndicatorSnapshot) -> MarketState {
    if candles.len() < MIN_CANDLES {
        return MarketState::loading();
    }

    let closes = candle::closes(candles);
    let inputs = Inputs {
        close: closes[closes.len() - 1],
        ema9: ema(&closes, 9),
        ema21: ema(&closes, 21),
        ema50: ema(&closes, 50),
        indicators,
    };

    let (bull_score, bear_score) = EVIDENCE.iter().fold((0, 0), |(bull, bear), e| {
        match (e.vote)(&inputs) {
            Vote::Bull => (bull + e.weight, bear),
            Vote::Bear => (bull, bear + e.weight),
            Vote::Abstain => (bull, bear),
        }
    });

    let total = bull_score + bear_score;
    let confidence = if total == 0 {
        0
    } else {
        (100.0 * bull_score.max(bear_score) as f64 / total as f64).round() as u8
    };

    let avg_vol = average_volatility(&closes);

    let (regime, trend) = decide(bull_score, bear_score, avg_vol);

    MarketState {
        regime,
        confidence,
        trend,
        bull_score,
        bear_score,
        ema9: inputs.ema9,
        ema21: inputs.ema21,
        ema50: inputs.ema50,
    }
}
