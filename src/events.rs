//! # events
//!
//! Defines [`WsEvent`], every event broadcast to `/ws/monitor` subscribers.
//!
//! Events travel through a `tokio::sync::broadcast::Sender<String>` as
//! pre-serialised JSON, so subscribers never need the engine types.

use serde::Serialize;

use crate::engine::simulation::EngineSnapshot;
use crate::models::{Candle, MarketState, Trade};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WsEvent {
    /// Full engine view, sent once to each client right after it connects.
    Snapshot {
        snapshot: Box<EngineSnapshot>,
    },

    /// A tick completed.
    Tick {
        tick:            u64,
        candle:          Candle,
        market:          MarketState,
        buy_score:       f64,
        sell_score:      f64,
        portfolio_value: f64,
    },

    /// The executor filled a paper trade during the last tick.
    TradeExecuted {
        trade: Box<Trade>,
    },

    /// The runner observed a run/pause or interval change.
    RunStateChanged {
        running:     bool,
        interval_ms: u64,
    },
}

impl WsEvent {
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"event":"SERIALIZATION_ERROR"}"#.to_string())
    }
}
