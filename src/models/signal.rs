//! # models::signal
//!
//! Weighted trade evidence emitted by the signal scorer.

use serde::{Deserialize, Serialize};

/// Direction of a signal or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Strong,
    Moderate,
}

/// One fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub reason: String,
    pub strength: Strength,
    pub score: f64,
}

/// All buy and sell evidence for a tick. Both sides may be populated at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub buy: Vec<Signal>,
    pub sell: Vec<Signal>,
}

impl SignalSet {
    pub fn signals(&self, side: Side) -> &[Signal] {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    /// Sum of the fired rule scores on one side.
    pub fn score(&self, side: Side) -> f64 {
        self.signals(side).iter().map(|s| s.score).sum()
    }

    /// Reason of the highest-scoring signal on one side. Ties go to the rule
    /// that fired first.
    pub fn top_reason(&self, side: Side) -> Option<&str> {
        let mut best: Option<&Signal> = None;
        for signal in self.signals(side) {
            match best {
                Some(b) if b.score >= signal.score => {}
                _ => best = Some(signal),
            }
        }
        best.map(|s| s.reason.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(reason: &str, score: f64) -> Signal {
        Signal { reason: reason.into(), strength: Strength::Moderate, score }
    }

    #[test]
    fn score_sums_one_side_only() {
        let set = SignalSet {
            buy:  vec![sig("a", 1.5), sig("b", 2.5)],
            sell: vec![sig("c", 3.0)],
        };
        assert_eq!(set.score(Side::Buy), 4.0);
        assert_eq!(set.score(Side::Sell), 3.0);
    }

    #[test]
    fn top_reason_prefers_highest_then_earliest() {
        let set = SignalSet {
            buy:  vec![sig("low", 1.5), sig("first", 3.0), sig("second", 3.0)],
            sell: vec![],
        };
        assert_eq!(set.top_reason(Side::Buy), Some("first"));
        assert_eq!(set.top_reason(Side::Sell), None);
    }
}
