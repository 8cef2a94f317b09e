//! # engine::indicators
//!
//! **Indicator Library**: pure functions over a close-price sequence, most
//! recent last. Every function returns a documented neutral value when the
//! sequence is too short instead of failing.

use crate::models::{Bollinger, IndicatorSnapshot, Macd};

pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_MULT: f64 = 2.0;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;

/// Signal line as a fixed fraction of the MACD line. This is not a 9-period
/// EMA of MACD; the signal rules are tuned against this approximation.
const MACD_SIGNAL_RATIO: f64 = 0.9;

/// Exponential moving average seeded with the SMA of the first `period`
/// values. `None` until `period` values are available.
pub fn ema(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let seed = closes[..period].iter().sum::<f64>() / period as f64;
    Some(
        closes[period..]
            .iter()
            .fold(seed, |ema, &price| price * k + ema * (1.0 - k)),
    )
}

/// RSI using simple averages of the last `period` gains and losses.
///
/// Returns 50 while warming up and 100 when there were no losses.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }
    let window = &closes[closes.len() - period - 1..];

    let (gains, losses) = window.windows(2).fold((0.0, 0.0), |(g, l), pair| {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            (g + delta, l)
        } else {
            (g, l - delta)
        }
    });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// `EMA(12) - EMA(26)` with the approximated signal line and histogram.
pub fn macd(closes: &[f64]) -> Macd {
    match (ema(closes, MACD_FAST), ema(closes, MACD_SLOW)) {
        (Some(fast), Some(slow)) => {
            let line = fast - slow;
            let signal = line * MACD_SIGNAL_RATIO;
            Macd { macd: line, signal, histogram: line - signal }
        }
        _ => Macd::default(),
    }
}

/// SMA middle band with `±2σ` (population) outer bands over the last
/// `period` closes. All zeros while warming up.
pub fn bollinger(closes: &[f64], period: usize) -> Bollinger {
    if period == 0 || closes.len() < period {
        return Bollinger::default();
    }
    let slice = &closes[closes.len() - period..];
    let middle = slice.iter().sum::<f64>() / period as f64;
    let variance = slice.iter().map(|v| (v - middle).powi(2)).sum::<f64>() / period as f64;
    let std = variance.sqrt();

    Bollinger {
        upper: middle + BOLLINGER_STD_MULT * std,
        middle,
        lower: middle - BOLLINGER_STD_MULT * std,
    }
}

/// Compute every indicator the classifier and scorer need.
pub fn snapshot(closes: &[f64]) -> IndicatorSnapshot {
    let prev_macd = match closes.split_last() {
        Some((_, earlier)) => macd(earlier),
        None => Macd::default(),
    };

    IndicatorSnapshot {
        rsi: rsi(closes, RSI_PERIOD),
        macd: macd(closes),
        prev_macd,
        bollinger: bollinger(closes, BOLLINGER_PERIOD),
    }
}
