//! # models::trade
//!
//! The virtual portfolio and the two histories the execution engine writes:
//! executed [`Trade`]s and human-readable [`LogEntry`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Side;

// ─── Portfolio ────────────────────────────────────────────────────────────────

/// Paper balances. Neither field is ever negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub usd: f64,
    pub btc: f64,
}

impl Portfolio {
    pub fn new(usd: f64) -> Self {
        Self { usd, btc: 0.0 }
    }

    /// Mark-to-market value at `price`.
    #[inline]
    pub fn value_at(&self, price: f64) -> f64 {
        self.usd + self.btc * price
    }
}

// ─── Trade ────────────────────────────────────────────────────────────────────

/// A filled paper trade. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub side: Side,
    pub price: f64,
    /// BTC bought or sold.
    pub amount: f64,
    /// USD spent (BUY) or received (SELL).
    pub usd: f64,
    pub reason: String,
    pub time: DateTime<Utc>,
}

// ─── Log ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Buy,
    Sell,
    /// Run/pause transitions and interval changes.
    System,
}

impl From<Side> for LogKind {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => LogKind::Buy,
            Side::Sell => LogKind::Sell,
        }
    }
}

/// Observational log line. Never read back by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            timestamp: Utc::now(),
        }
    }
}
