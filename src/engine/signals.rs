//! # engine::signals
//!
//! **Signal Scorer**: evaluates a fixed table of buy and sell rules against
//! this tick's indicators and market state. Rules are independent: any
//! number may fire on either side in the same tick.
//!
//! The scorer only weighs evidence. Whether the aggregate is large enough to
//! trade is decided by the simulation loop.

use crate::engine::regime::MIN_CANDLES;
use crate::models::{
    Candle, IndicatorSnapshot, MarketState, Side, Signal, SignalSet, Strength, Trend,
};

/// Aggregate score on one side at which the simulation loop trades.
pub const TRADE_THRESHOLD: f64 = 4.0;

const LOWER_BAND_TOLERANCE: f64 = 1.002;
const UPPER_BAND_TOLERANCE: f64 = 0.998;

// ─── Rule Table ───────────────────────────────────────────────────────────────

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub close: f64,
    pub indicators: &'a IndicatorSnapshot,
    pub market: &'a MarketState,
}

/// A data-described trigger: when `fires` holds, the rule contributes a
/// [`Signal`] with its reason, strength and score.
pub struct SignalRule {
    pub side: Side,
    pub reason: &'static str,
    pub strength: Strength,
    pub score: f64,
    pub fires: fn(&RuleContext) -> bool,
}

impl SignalRule {
    fn to_signal(&self) -> Signal {
        Signal {
            reason: self.reason.to_string(),
            strength: self.strength,
            score: self.score,
        }
    }
}

fn rsi_oversold(c: &RuleContext) -> bool {
    c.indicators.rsi < 35.0
}

fn rsi_low_zone(c: &RuleContext) -> bool {
    (35.0..45.0).contains(&c.indicators.rsi)
}

fn lower_band_touch(c: &RuleContext) -> bool {
    c.close < c.indicators.bollinger.lower * LOWER_BAND_TOLERANCE
}

fn macd_crosses_up(c: &RuleContext) -> bool {
    let (prev, now) = (c.indicators.prev_macd, c.indicators.macd);
    prev.macd < prev.signal && now.macd > now.signal
}

fn trend_alignment(c: &RuleContext) -> bool {
    c.market.trend == Trend::Bullish && c.market.ema9.is_some_and(|ema9| c.close > ema9)
}

fn rsi_overbought(c: &RuleContext) -> bool {
    c.indicators.rsi > 65.0
}

fn rsi_high_zone(c: &RuleContext) -> bool {
    c.indicators.rsi > 55.0 && c.indicators.rsi <= 65.0
}

fn upper_band_touch(c: &RuleContext) -> bool {
    c.close > c.indicators.bollinger.upper * UPPER_BAND_TOLERANCE
}

fn macd_crosses_down(c: &RuleContext) -> bool {
    let (prev, now) = (c.indicators.prev_macd, c.indicators.macd);
    prev.macd > prev.signal && now.macd < now.signal
}

fn downtrend_confirm(c: &RuleContext) -> bool {
    c.market.trend == Trend::Bearish && c.market.ema9.is_some_and(|ema9| c.close < ema9)
}

pub const RULES: &[SignalRule] = &[
    SignalRule { side: Side::Buy,  reason: "RSI Oversold",           strength: Strength::Strong,   score: 3.0, fires: rsi_oversold },
    SignalRule { side: Side::Buy,  reason: "RSI Low Zone",           strength: Strength::Moderate, score: 1.5, fires: rsi_low_zone },
    SignalRule { side: Side::Buy,  reason: "Bollinger Lower Touch",  strength: Strength::Strong,   score: 2.5, fires: lower_band_touch },
    SignalRule { side: Side::Buy,  reason: "MACD Bullish Crossover", strength: Strength::Strong,   score: 3.0, fires: macd_crosses_up },
    SignalRule { side: Side::Buy,  reason: "EMA Trend Alignment",    strength: Strength::Moderate, score: 2.0, fires: trend_alignment },
    SignalRule { side: Side::Sell, reason: "RSI Overbought",         strength: Strength::Strong,   score: 3.0, fires: rsi_overbought },
    SignalRule { side: Side::Sell, reason: "RSI High Zone",          strength: Strength::Moderate, score: 1.5, fires: rsi_high_zone },
    SignalRule { side: Side::Sell, reason: "Bollinger Upper Touch",  strength: Strength::Strong,   score: 2.5, fires: upper_band_touch },
    SignalRule { side: Side::Sell, reason: "MACD Bearish Crossover", strength: Strength::Strong,   score: 3.0, fires: macd_crosses_down },
    SignalRule { side: Side::Sell, reason: "EMA Downtrend Confirm",  strength: Strength::Moderate, score: 2.0, fires: downtrend_confirm },
];

// ─── Scoring ──────────────────────────────────────────────────────────────────

/// Evaluate every rule. Returns an empty set while the window is warming up.
pub fn score(
    candles: &[Candle],
    indicators: &IndicatorSnapshot,
    market: &MarketState,
) -> SignalSet {
    let Some(last) = candles.last() else {
        return SignalSet::default();
    };
    if candles.len() < MIN_CANDLES {
        return SignalSet::default();
    }

    let ctx = RuleContext { close: last.close, indicators, market };

    let mut set = SignalSet::default();
    for rule in RULES.iter().filter(|r| (r.fires)(&ctx)) {
        match rule.side {
            Side::Buy => set.buy.push(rule.to_signal()),
            Side::Sell => set.sell.push(rule.to_signal()),
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bollinger, Macd, Regime};
    use chrono::Utc;

    fn window(close: f64) -> Vec<Candle> {
        (0..MIN_CANDLES)
            .map(|_| Candle {
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
                time: Utc::now(),
            })
            .collect()
    }

    fn macd(line: f64) -> Macd {
        Macd { macd: line, signal: line * 0.9, histogram: line * 0.1 }
    }

    fn indicators(rsi: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            macd: macd(1.0),
            prev_macd: macd(1.0),
            bollinger: Bollinger { upper: 110.0, middle: 100.0, lower: 90.0 },
        }
    }

    fn market(trend: Trend, ema9: f64) -> MarketState {
        MarketState {
            regime: Regime::Ranging,
            trend,
            ema9: Some(ema9),
            ..MarketState::loading()
        }
    }

    fn reasons(signals: &[Signal]) -> Vec<&str> {
        signals.iter().map(|s| s.reason.as_str()).collect()
    }

    #[test]
    fn empty_while_warming_up() {
        let mut candles = window(100.0);
        candles.pop();
        let set = score(&candles, &indicators(10.0), &market(Trend::Neutral, 100.0));
        assert_eq!(set, SignalSet::default());
        assert_eq!(score(&[], &indicators(10.0), &MarketState::loading()), SignalSet::default());
    }

    #[test]
    fn rsi_zones_are_exclusive() {
        let candles = window(100.0);
        let m = market(Trend::Neutral, 100.0);

        assert_eq!(reasons(&score(&candles, &indicators(30.0), &m).buy), ["RSI Oversold"]);
        assert_eq!(reasons(&score(&candles, &indicators(35.0), &m).buy), ["RSI Low Zone"]);
        assert!(score(&candles, &indicators(45.0), &m).buy.is_empty());
        assert!(score(&candles, &indicators(55.0), &m).sell.is_empty());
        assert_eq!(reasons(&score(&candles, &indicators(65.0), &m).sell), ["RSI High Zone"]);
        assert_eq!(reasons(&score(&candles, &indicators(70.0), &m).sell), ["RSI Overbought"]);
    }

    #[test]
    fn band_touches() {
        let m = market(Trend::Neutral, 100.0);
        let set = score(&window(90.1), &indicators(50.0), &m);
        assert_eq!(reasons(&set.buy), ["Bollinger Lower Touch"]);

        let set = score(&window(109.9), &indicators(50.0), &m);
        assert_eq!(reasons(&set.sell), ["Bollinger Upper Touch"]);
    }

    #[test]
    fn macd_crossovers_need_a_sign_change() {
        let candles = window(100.0);
        let m = market(Trend::Neutral, 100.0);

        let mut ind = indicators(50.0);
        ind.prev_macd = macd(-0.5);
        ind.macd = macd(0.5);
        assert_eq!(reasons(&score(&candles, &ind, &m).buy), ["MACD Bullish Crossover"]);

        ind.prev_macd = macd(0.5);
        ind.macd = macd(-0.5);
        assert_eq!(reasons(&score(&candles, &ind, &m).sell), ["MACD Bearish Crossover"]);

        // staying positive is not a crossover
        ind.prev_macd = macd(0.5);
        ind.macd = macd(0.7);
        let set = score(&candles, &ind, &m);
        assert!(set.buy.is_empty() && set.sell.is_empty());
    }

    #[test]
    fn leaving_a_flat_macd_is_not_a_crossover() {
        let candles = window(100.0);
        let m = market(Trend::Neutral, 100.0);

        let mut ind = indicators(50.0);
        ind.prev_macd = Macd::default();
        ind.macd = macd(0.04);
        assert!(score(&candles, &ind, &m).buy.is_empty());

        ind.macd = macd(-0.04);
        assert!(score(&candles, &ind, &m).sell.is_empty());
    }

    #[test]
    fn flat_history_then_a_jump_fires_no_crossover() {
        let mut closes = vec![100.0; 40];
        closes.push(100.5);
        let ind = crate::engine::indicators::snapshot(&closes);
        assert!(ind.prev_macd.macd.abs() < 1e-9);
        assert!(ind.macd.macd > ind.macd.signal);

        let candles: Vec<Candle> = closes
            .iter()
            .map(|&c| Candle { open: c, high: c, low: c, close: c, volume: 1000.0, time: Utc::now() })
            .collect();
        let set = score(&candles, &ind, &market(Trend::Neutral, 100.0));
        assert!(!set.buy.iter().any(|s| s.reason == "MACD Bullish Crossover"));
    }

    #[test]
    fn trend_rules_follow_market_state() {
        let candles = window(100.0);
        let set = score(&candles, &indicators(50.0), &market(Trend::Bullish, 99.0));
        assert_eq!(reasons(&set.buy), ["EMA Trend Alignment"]);

        let set = score(&candles, &indicators(50.0), &market(Trend::Bearish, 101.0));
        assert_eq!(reasons(&set.sell), ["EMA Downtrend Confirm"]);

        let set = score(&candles, &indicators(50.0), &market(Trend::Bullish, 101.0));
        assert!(set.buy.is_empty());
    }

    #[test]
    fn rules_stack_and_both_sides_coexist() {
        // oversold + lower-band touch + trend alignment on the buy side,
        // upper-band touch on the sell side via a squeezed band
        let candles = window(100.0);
        let mut ind = indicators(20.0);
        ind.bollinger = Bollinger { upper: 100.1, middle: 100.05, lower: 100.0 };
        let set = score(&candles, &ind, &market(Trend::Bullish, 99.0));

        assert_eq!(
            reasons(&set.buy),
            ["RSI Oversold", "Bollinger Lower Touch", "EMA Trend Alignment"]
        );
        assert_eq!(set.score(Side::Buy), 7.5);
        assert_eq!(reasons(&set.sell), ["Bollinger Upper Touch"]);
        assert!(set.score(Side::Buy) >= TRADE_THRESHOLD);
        assert!(set.score(Side::Sell) < TRADE_THRESHOLD);
    }
}
