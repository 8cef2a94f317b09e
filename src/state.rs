//! # state
//!
//! The **shared application state**: the simulation behind an async
//! `RwLock`, the control channel the runner watches, and the broadcast
//! channel every WebSocket subscriber listens on.
//!
//! * The runner is the only writer of the simulation (one `tick` per lock).
//! * HTTP handlers take read locks and copy what they need out.
//! * Control changes go through a `watch` channel, so the runner reacts to
//!   them without polling.

use std::sync::Arc;

use tokio::sync::{broadcast, watch, RwLock};

use crate::config::SimConfig;
use crate::engine::runner::{SimControl, TickInterval};
use crate::engine::simulation::Simulation;
use crate::events::WsEvent;

const BROADCAST_CAPACITY: usize = 256;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
pub struct AppState {
    // ── Engine ────────────────────────────────────────────────────────────────
    pub simulation: Arc<RwLock<Simulation>>,

    // ── Control ───────────────────────────────────────────────────────────────
    /// Running flag and tick interval. The runner holds the only long-lived
    /// receiver.
    pub control_tx: watch::Sender<SimControl>,

    // ── Monitor / WebSocket ───────────────────────────────────────────────────
    /// Pre-serialised JSON events.
    pub broadcast_tx: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(config: &SimConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (control_tx, _) = watch::channel(config.initial_control());

        Self {
            simulation: Arc::new(RwLock::new(Simulation::from_config(config))),
            control_tx,
            broadcast_tx,
        }
    }

    // ── Helper Methods ────────────────────────────────────────────────────────

    /// Send an event to every WebSocket client. Having no listener is fine.
    pub fn broadcast(&self, event: &WsEvent) {
        let _ = self.broadcast_tx.send(event.to_json());
    }

    pub fn control(&self) -> SimControl {
        *self.control_tx.borrow()
    }

    /// Returns `true` when the value actually changed.
    pub fn set_running(&self, running: bool) -> bool {
        self.control_tx.send_if_modified(|c| {
            let changed = c.running != running;
            c.running = running;
            changed
        })
    }

    /// Returns `true` when the value actually changed.
    pub fn set_interval(&self, interval: TickInterval) -> bool {
        self.control_tx.send_if_modified(|c| {
            let changed = c.interval != interval;
            c.interval = interval;
            changed
        })
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(config: &SimConfig) -> SharedState {
    Arc::new(AppState::new(config))
}
