//! # engine::runner
//!
//! **Simulation Runner**: the scheduler that drives [`Simulation::tick`].
//!
//! ```text
//!            run = true                      sleep(interval) elapsed
//!  PAUSED ────────────────▶ RUNNING ──────────────────────────────▶ tick ─┐
//!    ▲                        │  ▲                                       │
//!    └────── run = false ─────┘  └─────────── reschedule ◀───────────────┘
//! ```
//!
//! * Fixed delay, not fixed rate: the next sleep starts only after the
//!   previous tick has finished, so ticks never overlap.
//! * Control changes arrive through a `watch` channel. A change during the
//!   sleep cancels the pending wake-up and reschedules with the new values;
//!   a change during a tick is seen once that tick completes.
//!
//! [`Simulation::tick`]: crate::engine::simulation::Simulation::tick

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::events::WsEvent;
use crate::models::LogKind;
use crate::state::SharedState;

// ─── Tick Interval ────────────────────────────────────────────────────────────

/// The supported tick speeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum TickInterval {
    Ms200,
    Ms500,
    #[default]
    Ms1000,
    Ms2000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interval must be one of 200, 500, 1000 or 2000 ms (got {0})")]
pub struct InvalidInterval(pub u64);

impl TickInterval {
    pub const ALL: [TickInterval; 4] = [Self::Ms200, Self::Ms500, Self::Ms1000, Self::Ms2000];

    pub fn as_millis(self) -> u64 {
        match self {
            Self::Ms200 => 200,
            Self::Ms500 => 500,
            Self::Ms1000 => 1000,
            Self::Ms2000 => 2000,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_millis(self.as_millis())
    }
}

impl TryFrom<u64> for TickInterval {
    type Error = InvalidInterval;

    fn try_from(ms: u64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_millis() == ms)
            .ok_or(InvalidInterval(ms))
    }
}

impl From<TickInterval> for u64 {
    fn from(interval: TickInterval) -> Self {
        interval.as_millis()
    }
}

// ─── Control ──────────────────────────────────────────────────────────────────

/// The two inputs the outside world controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimControl {
    pub running: bool,
    pub interval: TickInterval,
}

// ─── Loop ─────────────────────────────────────────────────────────────────────

/// Drive the simulation until the control channel closes.
pub async fn run(state: SharedState) {
    let mut control_rx = state.control_tx.subscribe();
    let mut previous = *control_rx.borrow_and_update();

    info!(
        running     = previous.running,
        interval_ms = previous.interval.as_millis(),
        "⏱️  Simulation runner started"
    );

    loop {
        let control = *control_rx.borrow_and_update();
        if control != previous {
            record_transition(&state, previous, control).await;
            previous = control;
        }

        if !control.running {
            // PAUSED: nothing is scheduled until the controls change
            if control_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(control.interval.duration()) => {
                run_tick(&state).await;
            }
            changed = control_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Simulation runner stopped, control channel closed");
}

/// Execute one tick under the write lock and publish what it produced.
pub async fn run_tick(state: &SharedState) {
    let (outcome, analysis, portfolio_value, tick_no) = {
        let mut sim = state.simulation.write().await;
        let outcome = sim.tick();
        (outcome, sim.analysis().clone(), sim.portfolio_value(), sim.tick_count())
    };

    debug!(tick = tick_no, trades = outcome.trades.len(), "Tick published");

    state.broadcast(&WsEvent::Tick {
        tick:            tick_no,
        candle:          outcome.candle,
        market:          analysis.market,
        buy_score:       analysis.buy_score,
        sell_score:      analysis.sell_score,
        portfolio_value,
    });

    for trade in outcome.trades {
        state.broadcast(&WsEvent::TradeExecuted { trade: Box::new(trade) });
    }
}

/// Log a control change into the engine log and notify subscribers.
async fn record_transition(state: &SharedState, from: SimControl, to: SimControl) {
    let mut messages = Vec::new();
    if from.running != to.running {
        messages.push(if to.running {
            "Bot started".to_string()
        } else {
            "Bot paused".to_string()
        });
    }
    if from.interval != to.interval {
        messages.push(format!("Tick interval set to {}ms", to.interval.as_millis()));
    }

    {
        let mut sim = state.simulation.write().await;
        for message in &messages {
            sim.push_log(LogKind::System, message.as_str());
        }
    }

    info!(
        running     = to.running,
        interval_ms = to.interval.as_millis(),
        "🎛️  Simulation control changed"
    );

    state.broadcast(&WsEvent::RunStateChanged {
        running:     to.running,
        interval_ms: to.interval.as_millis(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::state::build_state;

    /// Let the spawned runner observe whatever just changed.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    async fn ticks(state: &SharedState) -> u64 {
        state.simulation.read().await.tick_count()
    }

    async fn step(ms: u64) {
        tokio::time::advance(Duration::from_millis(ms)).await;
        settle().await;
    }

    #[test]
    fn interval_accepts_only_presets() {
        for ms in [200, 500, 1000, 2000] {
            assert_eq!(TickInterval::try_from(ms).unwrap().as_millis(), ms);
        }
        assert_eq!(TickInterval::try_from(750), Err(InvalidInterval(750)));
        assert_eq!(TickInterval::default(), TickInterval::Ms1000);
    }

    #[test]
    fn interval_serializes_as_millis() {
        let json = serde_json::to_string(&TickInterval::Ms500).unwrap();
        assert_eq!(json, "500");
        let parsed: TickInterval = serde_json::from_str("2000").unwrap();
        assert_eq!(parsed, TickInterval::Ms2000);
        assert!(serde_json::from_str::<TickInterval>("300").is_err());
    }

    #[test]
    fn control_starts_paused() {
        assert!(!SimControl::default().running);
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_while_paused() {
        let state = build_state(&SimConfig::for_tests(11));
        let runner = tokio::spawn(run(state.clone()));
        settle().await;

        step(10_000).await;
        assert_eq!(ticks(&state).await, 0);

        runner.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_a_fixed_delay_and_stops_when_paused() {
        let state = build_state(&SimConfig::for_tests(11));
        let runner = tokio::spawn(run(state.clone()));
        settle().await;

        state.set_interval(TickInterval::Ms500);
        state.set_running(true);
        settle().await;

        step(499).await;
        assert_eq!(ticks(&state).await, 0);
        step(1).await;
        assert_eq!(ticks(&state).await, 1);
        step(500).await;
        assert_eq!(ticks(&state).await, 2);

        state.set_running(false);
        settle().await;
        step(5_000).await;
        assert_eq!(ticks(&state).await, 2);

        let sim = state.simulation.read().await;
        let messages: Vec<&str> = sim.log().iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Bot started"));
        assert!(messages.contains(&"Bot paused"));
        assert!(messages.contains(&"Tick interval set to 500ms"));
        drop(sim);

        runner.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_mid_sleep_reschedules() {
        let state = build_state(&SimConfig::for_tests(12));
        let runner = tokio::spawn(run(state.clone()));
        settle().await;

        state.set_interval(TickInterval::Ms2000);
        state.set_running(true);
        settle().await;

        // halfway through the 2000 ms sleep, speed up to 200 ms
        step(500).await;
        assert_eq!(ticks(&state).await, 0);
        state.set_interval(TickInterval::Ms200);
        settle().await;

        step(199).await;
        assert_eq!(ticks(&state).await, 0);
        step(1).await;
        assert_eq!(ticks(&state).await, 1);
        step(200).await;
        assert_eq!(ticks(&state).await, 2);

        let sim = state.simulation.read().await;
        assert!(sim.log().iter().any(|e| e.message == "Tick interval set to 200ms"));
        drop(sim);

        runner.abort();
    }

    #[tokio::test]
    async fn run_tick_publishes_events() {
        let state = build_state(&SimConfig::for_tests(3));
        let mut rx = state.broadcast_tx.subscribe();

        run_tick(&state).await;

        let first = rx.recv().await.unwrap();
        let event: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(event["event"], "TICK");
        assert_eq!(event["tick"], 1);
        assert_eq!(ticks(&state).await, 1);
    }
}
