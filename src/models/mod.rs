//! Domain models shared across the engine, the runner and the HTTP layer.

pub mod candle;
pub mod market;
pub mod signal;
pub mod trade;

pub use candle::Candle;
pub use market::{Bollinger, IndicatorSnapshot, Macd, MarketState, Regime, Trend};
pub use signal::{Side, Signal, SignalSet, Strength};
pub use trade::{LogEntry, LogKind, Portfolio, Trade};
