//! # engine::executor
//!
//! **Paper Executor**: fills simulated orders against the virtual portfolio
//! with fixed-fraction sizing, and keeps the bounded trade and log histories.
//!
//! | Side | Guard             | Size                 |
//! |------|-------------------|----------------------|
//! | BUY  | `usd > 100`       | 30 % of USD balance  |
//! | SELL | `btc > 0.0001`    | 50 % of BTC holdings |
//!
//! A fill that fails its guard is skipped without touching any state.

use std::collections::VecDeque;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{LogEntry, LogKind, Portfolio, Side, Trade};

pub const MAX_TRADES: usize = 50;
pub const MAX_LOG_ENTRIES: usize = 20;

const MIN_USD_TO_BUY: f64 = 100.0;
const MIN_BTC_TO_SELL: f64 = 0.0001;
const BUY_FRACTION: f64 = 0.3;
const SELL_FRACTION: f64 = 0.5;

// ─── Executor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PaperExecutor {
    portfolio: Portfolio,
    /// Newest first.
    trades: VecDeque<Trade>,
    /// Newest first.
    log: VecDeque<LogEntry>,
}

impl PaperExecutor {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            trades: VecDeque::with_capacity(MAX_TRADES),
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    pub fn portfolio(&self) -> Portfolio {
        self.portfolio
    }

    pub fn trades(&self) -> &VecDeque<Trade> {
        &self.trades
    }

    pub fn log(&self) -> &VecDeque<LogEntry> {
        &self.log
    }

    /// Fill one paper order at `price`.
    ///
    /// Returns the recorded trade, or `None` when the balance guard skipped
    /// it. On success the portfolio, trade history and log all change
    /// together.
    pub fn execute_trade(&mut self, side: Side, price: f64, reason: &str) -> Option<Trade> {
        if price.is_nan() || price <= 0.0 {
            debug!(price, "Non-positive fill price, order skipped");
            return None;
        }

        let Portfolio { usd, btc } = self.portfolio;

        let (amount, notional) = match side {
            Side::Buy if usd > MIN_USD_TO_BUY => {
                let spend = usd * BUY_FRACTION;
                let bought = spend / price;
                self.portfolio = Portfolio { usd: usd - spend, btc: btc + bought };
                (bought, spend)
            }
            Side::Sell if btc > MIN_BTC_TO_SELL => {
                let sold = btc * SELL_FRACTION;
                let proceeds = sold * price;
                self.portfolio = Portfolio { usd: usd + proceeds, btc: btc - sold };
                (sold, proceeds)
            }
            _ => {
                debug!(%side, usd, btc, "Insufficient balance, order skipped");
                return None;
            }
        };

        let trade = Trade {
            id: Uuid::new_v4(),
            side,
            price,
            amount,
            usd: notional,
            reason: reason.to_string(),
            time: Utc::now(),
        };

        push_bounded(&mut self.trades, trade.clone(), MAX_TRADES);
        self.push_log(
            side.into(),
            format!("{side} {amount:.5} BTC @ ${price:.0} | {reason}"),
        );

        info!(
            %side,
            price,
            amount,
            usd    = notional,
            reason,
            "💸 [EXECUTOR] Paper trade filled"
        );

        Some(trade)
    }

    /// Append an observational log line, evicting the oldest beyond the cap.
    pub fn push_log(&mut self, kind: LogKind, message: impl Into<String>) {
        push_bounded(&mut self.log, LogEntry::new(kind, message), MAX_LOG_ENTRIES);
    }
}

/// Insert at the front and drop from the back once `cap` is exceeded.
fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, cap: usize) {
    queue.push_front(item);
    queue.truncate(cap);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn buy_spends_thirty_percent() {
        let mut exec = PaperExecutor::new(Portfolio { usd: 150.0, btc: 0.0 });
        let trade = exec.execute_trade(Side::Buy, 50_000.0, "RSI Oversold").unwrap();

        assert!(approx(trade.usd, 45.0));
        assert!(approx(trade.amount, 0.0009));
        assert!(approx(exec.portfolio().usd, 105.0));
        assert!(approx(exec.portfolio().btc, 0.0009));
        assert_eq!(exec.trades().len(), 1);
        assert_eq!(exec.log().len(), 1);
        assert_eq!(exec.log()[0].kind, LogKind::Buy);
    }

    #[test]
    fn sell_liquidates_half() {
        let mut exec = PaperExecutor::new(Portfolio { usd: 0.0, btc: 0.001 });
        let trade = exec.execute_trade(Side::Sell, 50_000.0, "RSI Overbought").unwrap();

        assert!(approx(trade.amount, 0.0005));
        assert!(approx(trade.usd, 25.0));
        assert!(approx(exec.portfolio().usd, 25.0));
        assert!(approx(exec.portfolio().btc, 0.0005));
        assert_eq!(exec.log()[0].kind, LogKind::Sell);
    }

    #[test]
    fn insufficient_balance_is_a_silent_no_op() {
        let start = Portfolio { usd: 50.0, btc: 0.00005 };
        let mut exec = PaperExecutor::new(start);

        assert!(exec.execute_trade(Side::Buy, 50_000.0, "x").is_none());
        assert!(exec.execute_trade(Side::Sell, 50_000.0, "x").is_none());
        assert_eq!(exec.portfolio(), start);
        assert!(exec.trades().is_empty());
        assert!(exec.log().is_empty());
    }

    #[test]
    fn guards_are_strict() {
        let mut exec = PaperExecutor::new(Portfolio { usd: 100.0, btc: 0.0001 });
        assert!(exec.execute_trade(Side::Buy, 50_000.0, "x").is_none());
        assert!(exec.execute_trade(Side::Sell, 50_000.0, "x").is_none());
    }

    #[test]
    fn trade_history_is_capped_newest_first() {
        let mut exec = PaperExecutor::new(Portfolio::new(1e12));
        for i in 0..(MAX_TRADES + 1) {
            let price = 1_000.0 + i as f64;
            exec.execute_trade(Side::Buy, price, "fill").unwrap();
        }

        assert_eq!(exec.trades().len(), MAX_TRADES);
        // the first fill (price 1000) was evicted; the newest leads
        assert_eq!(exec.trades()[0].price, 1_000.0 + MAX_TRADES as f64);
        assert_eq!(exec.trades()[MAX_TRADES - 1].price, 1_001.0);
        assert_eq!(exec.log().len(), MAX_LOG_ENTRIES);
    }

    #[test]
    fn log_message_describes_fill() {
        let mut exec = PaperExecutor::new(Portfolio::new(10_000.0));
        exec.execute_trade(Side::Buy, 50_000.0, "EMA Trend Alignment");
        assert_eq!(exec.log()[0].message, "BUY 0.06000 BTC @ $50000 | EMA Trend Alignment");
    }
}
