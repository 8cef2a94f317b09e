//! # models::candle
//!
//! Defines [`Candle`], one bar of the synthetic BTC/USDT price series.
//!
//! Candles are produced by the price generator and never modified after
//! they are appended to the simulation window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar.
///
/// Invariants: every price is positive, `high >= max(open, close)` and
/// `low <= min(open, close)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    /// Synthetic traded volume (whole units, stored as float).
    pub volume: f64,

    /// UTC timestamp at which the generator produced this bar.
    pub time: DateTime<Utc>,
}

impl Candle {
    /// Percentage change of `close` relative to `prev_close`.
    #[inline]
    pub fn change_pct_from(&self, prev_close: f64) -> f64 {
        if prev_close == 0.0 {
            return 0.0;
        }
        (self.close - prev_close) / prev_close * 100.0
    }
}

/// Pull the close prices out of a candle sequence, oldest first.
pub fn closes<'a, I>(candles: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Candle>,
{
    candles.into_iter().map(|c| c.close).collect()
}
