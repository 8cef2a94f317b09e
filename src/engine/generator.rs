//! # engine::generator
//!
//! **Price Generator**: produces the next synthetic candle from the previous
//! close. The random source is injected so tests can seed it.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Candle;

/// Lowest close the generator will ever emit.
const MIN_PRICE: f64 = 0.01;

// ─── Params ───────────────────────────────────────────────────────────────────

/// Shape of the random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorParams {
    /// Subtracted from a `U[0,1)` draw before scaling. Values above 0.5 bias
    /// the walk downward; the default 0.48 leans slightly upward.
    pub drift: f64,
    /// Fraction of the previous close moved by a full-size draw.
    pub step: f64,
    /// Maximum wick extension as a fraction of the body edge.
    pub max_wick: f64,
    /// Half-open volume range `[low, high)`.
    pub volume_range: (u64, u64),
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            drift:        0.48,
            step:         0.012,
            max_wick:     0.005,
            volume_range: (500, 5500),
        }
    }
}

// ─── Generator ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PriceGenerator<R = StdRng> {
    rng: R,
    params: GeneratorParams,
}

impl PriceGenerator<StdRng> {
    /// Generator seeded from `seed`, or from OS entropy when `None`.
    pub fn from_seed(seed: Option<u64>, params: GeneratorParams) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, params)
    }
}

impl<R: Rng> PriceGenerator<R> {
    pub fn new(rng: R, params: GeneratorParams) -> Self {
        Self { rng, params }
    }

    /// Draw a uniform price in `[low, high)` from the same random source.
    pub fn starting_price(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }

    /// Produce the candle that follows `prev_close`.
    pub fn next(&mut self, prev_close: f64, volatility: f64) -> Candle {
        let p = self.params;

        let draw: f64 = self.rng.gen();
        let change = (draw - p.drift) * volatility * prev_close * p.step;

        let open = prev_close;
        let close = (prev_close + change).max(MIN_PRICE);

        let upper_wick: f64 = self.rng.gen_range(0.0..p.max_wick);
        let lower_wick: f64 = self.rng.gen_range(0.0..p.max_wick);
        let high = open.max(close) * (1.0 + upper_wick);
        let low = open.min(close) * (1.0 - lower_wick);

        let volume = self.rng.gen_range(p.volume_range.0..p.volume_range.1) as f64;

        Candle { open, high, low, close, volume, time: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ohlcv(c: &Candle) -> (f64, f64, f64, f64, f64) {
        (c.open, c.high, c.low, c.close, c.volume)
    }

    #[test]
    fn same_seed_same_series() {
        let mut a = PriceGenerator::from_seed(Some(7), GeneratorParams::default());
        let mut b = PriceGenerator::from_seed(Some(7), GeneratorParams::default());

        let mut pa = 45_000.0;
        let mut pb = 45_000.0;
        for _ in 0..200 {
            let ca = a.next(pa, 1.0);
            let cb = b.next(pb, 1.0);
            assert_eq!(ohlcv(&ca), ohlcv(&cb));
            pa = ca.close;
            pb = cb.close;
        }
    }

    #[test]
    fn candles_are_well_formed() {
        let mut generator = PriceGenerator::from_seed(Some(1), GeneratorParams::default());
        let mut price = 42_000.0;
        for _ in 0..1_000 {
            let c = generator.next(price, 1.2);
            assert_eq!(c.open, price);
            assert!(c.close > 0.0);
            assert!(c.high >= c.open.max(c.close));
            assert!(c.low <= c.open.min(c.close));
            assert!(c.low > 0.0);
            assert!((500.0..5500.0).contains(&c.volume));
            assert_eq!(c.volume.fract(), 0.0);
            price = c.close;
        }
    }

    #[test]
    fn close_is_floored_at_minimum_price() {
        // drift of 2.0 makes every change strongly negative
        let params = GeneratorParams { drift: 2.0, step: 1.0, ..GeneratorParams::default() };
        let mut generator = PriceGenerator::from_seed(Some(3), params);
        let c = generator.next(1.0, 1.0);
        assert_eq!(c.close, MIN_PRICE);
    }

    #[test]
    fn change_is_bounded_by_step() {
        let mut generator = PriceGenerator::from_seed(Some(11), GeneratorParams::default());
        for _ in 0..500 {
            let c = generator.next(10_000.0, 1.0);
            // |draw - drift| < 0.52, scaled by 10_000 * 0.012
            assert!((c.close - 10_000.0).abs() < 0.52 * 120.0 + 1e-9);
        }
    }
}
