//! # engine::simulation
//!
//! **Simulation**: the single authoritative owner of the candle window, the
//! paper portfolio and the trade/log histories. One call to
//! [`Simulation::tick`] runs the whole pipeline:
//!
//! ```text
//! last close ─▶ generator ─▶ window (≤150) ─▶ indicators ─▶ regime ─▶ signals
//!                                                                      │
//!                               BUY if buy score ≥ 4 ◀─────────────────┤
//!                               SELL if sell score ≥ 4 ◀───────────────┘
//! ```
//!
//! The scheduler in [`crate::engine::runner`] decides *when* to tick; this
//! module decides *what* a tick does.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::SimConfig;
use crate::engine::executor::PaperExecutor;
use crate::engine::generator::{GeneratorParams, PriceGenerator};
use crate::engine::runner::SimControl;
use crate::engine::signals::TRADE_THRESHOLD;
use crate::engine::{indicators, regime, signals};
use crate::models::candle;
use crate::models::{
    Candle, IndicatorSnapshot, LogEntry, LogKind, MarketState, Portfolio, Side, SignalSet, Trade,
};

pub const WINDOW_CAPACITY: usize = 150;
pub const WARMUP_CANDLES: usize = 80;
pub const PAIR: &str = "BTC/USDT";

const WARMUP_VOLATILITY: f64 = 1.2;
const TICK_VOLATILITY: f64 = 1.0;
const START_PRICE_LOW: f64 = 42_000.0;
const START_PRICE_HIGH: f64 = 47_000.0;
/// Used only if the window is somehow empty.
const FALLBACK_PRICE: f64 = 42_000.0;

// ─── Analysis ─────────────────────────────────────────────────────────────────

/// Everything derived from the current window. Recomputed, never updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub indicators: IndicatorSnapshot,
    pub market: MarketState,
    pub signals: SignalSet,
    pub buy_score: f64,
    pub sell_score: f64,
}

impl Analysis {
    pub fn of(candles: &[Candle]) -> Self {
        let closes = candle::closes(candles);
        let indicators = indicators::snapshot(&closes);
        let market = regime::classify(candles, &indicators);
        let signals = signals::score(candles, &indicators, &market);

        Self {
            buy_score: signals.score(Side::Buy),
            sell_score: signals.score(Side::Sell),
            indicators,
            market,
            signals,
        }
    }
}

/// What one tick produced.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub candle: Candle,
    /// Zero, one or two fills (BUY is always attempted before SELL).
    pub trades: Vec<Trade>,
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// Read-only view of the engine handed to consumers.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub pair: &'static str,
    pub running: bool,
    pub interval_ms: u64,
    pub tick_count: u64,
    pub trade_count: u64,
    pub last_price: f64,
    pub price_change_pct: f64,
    pub candles: Vec<Candle>,
    #[serde(flatten)]
    pub analysis: Analysis,
    pub portfolio: Portfolio,
    pub portfolio_value: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub trades: Vec<Trade>,
    pub log: Vec<LogEntry>,
}

// ─── Simulation ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Simulation<R = StdRng> {
    generator: PriceGenerator<R>,
    candles: VecDeque<Candle>,
    executor: PaperExecutor,
    analysis: Analysis,
    initial_usd: f64,
    tick_count: u64,
    /// Every fill since start, including ones evicted from the history.
    trade_count: u64,
}

impl Simulation<StdRng> {
    pub fn from_config(config: &SimConfig) -> Self {
        let params = GeneratorParams { drift: config.drift, ..GeneratorParams::default() };
        Self::new(PriceGenerator::from_seed(config.seed, params), config.initial_usd)
    }
}

impl<R: Rng> Simulation<R> {
    /// Build a simulation with [`WARMUP_CANDLES`] of history starting from a
    /// random price in `[42000, 47000)`.
    pub fn new(mut generator: PriceGenerator<R>, initial_usd: f64) -> Self {
        let mut price = generator.starting_price(START_PRICE_LOW, START_PRICE_HIGH);
        let mut candles = VecDeque::with_capacity(WINDOW_CAPACITY + 1);
        for _ in 0..WARMUP_CANDLES {
            let candle = generator.next(price, WARMUP_VOLATILITY);
            price = candle.close;
            candles.push_back(candle);
        }

        let analysis = Analysis::of(candles.make_contiguous());

        Self {
            generator,
            candles,
            executor: PaperExecutor::new(Portfolio::new(initial_usd)),
            analysis,
            initial_usd,
            tick_count: 0,
            trade_count: 0,
        }
    }

    /// Advance the market by one candle and act on the resulting signals.
    pub fn tick(&mut self) -> TickOutcome {
        // ── 1. Next candle from the last known close ─────────────────────────
        let candle = self.generator.next(self.last_close(), TICK_VOLATILITY);

        // ── 2. Append, evicting the oldest beyond capacity ───────────────────
        self.candles.push_back(candle.clone());
        while self.candles.len() > WINDOW_CAPACITY {
            self.candles.pop_front();
        }

        // ── 3. Indicators → regime → signals ─────────────────────────────────
        self.analysis = Analysis::of(self.candles.make_contiguous());
        self.tick_count += 1;

        debug!(
            tick       = self.tick_count,
            close      = candle.close,
            regime     = ?self.analysis.market.regime,
            buy_score  = self.analysis.buy_score,
            sell_score = self.analysis.sell_score,
            "Tick processed"
        );

        // ── 4. Threshold checks, BUY then SELL ───────────────────────────────
        let mut trades = Vec::with_capacity(2);
        for side in [Side::Buy, Side::Sell] {
            let score = match side {
                Side::Buy => self.analysis.buy_score,
                Side::Sell => self.analysis.sell_score,
            };
            if score < TRADE_THRESHOLD {
                continue;
            }
            let reason = self
                .analysis
                .signals
                .top_reason(side)
                .unwrap_or("Signal")
                .to_string();
            if let Some(trade) = self.executor.execute_trade(side, candle.close, &reason) {
                trades.push(trade);
            }
        }

        self.trade_count += trades.len() as u64;

        TickOutcome { candle, trades }
    }

    pub fn push_log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.executor.push_log(kind, message);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn candles(&self) -> &VecDeque<Candle> {
        &self.candles
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn portfolio(&self) -> Portfolio {
        self.executor.portfolio()
    }

    pub fn trades(&self) -> &VecDeque<Trade> {
        self.executor.trades()
    }

    pub fn log(&self) -> &VecDeque<LogEntry> {
        self.executor.log()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    pub fn last_close(&self) -> f64 {
        self.candles.back().map(|c| c.close).unwrap_or(FALLBACK_PRICE)
    }

    /// Close-to-close change of the newest candle, in percent.
    pub fn price_change_pct(&self) -> f64 {
        let n = self.candles.len();
        if n < 2 {
            return 0.0;
        }
        self.candles[n - 1].change_pct_from(self.candles[n - 2].close)
    }

    pub fn portfolio_value(&self) -> f64 {
        self.portfolio().value_at(self.last_close())
    }

    pub fn pnl(&self) -> f64 {
        self.portfolio_value() - self.initial_usd
    }

    pub fn pnl_pct(&self) -> f64 {
        if self.initial_usd == 0.0 {
            return 0.0;
        }
        self.pnl() / self.initial_usd * 100.0
    }

    pub fn snapshot(&self, control: SimControl) -> EngineSnapshot {
        EngineSnapshot {
            pair: PAIR,
            running: control.running,
            interval_ms: control.interval.as_millis(),
            tick_count: self.tick_count,
            trade_count: self.trade_count,
            last_price: self.last_close(),
            price_change_pct: self.price_change_pct(),
            candles: self.candles.iter().cloned().collect(),
            analysis: self.analysis.clone(),
            portfolio: self.portfolio(),
            portfolio_value: self.portfolio_value(),
            pnl: self.pnl(),
            pnl_pct: self.pnl_pct(),
            trades: self.trades().iter().cloned().collect(),
            log: self.log().iter().cloned().collect(),
        }
    }
}
