//! # routes::control
//!
//! Axum route handlers for the two simulation controls.
//!
//! | Method | Path                | Description                          |
//! |--------|---------------------|--------------------------------------|
//! | POST   | `/api/sim/start`    | Resume ticking                       |
//! | POST   | `/api/sim/pause`    | Stop scheduling ticks                |
//! | PUT    | `/api/sim/interval` | `{ "interval_ms": 200 \| 500 \| 1000 \| 2000 }` |
//! | GET    | `/api/sim/status`   | Controls plus tick / trade counters  |
//!
//! Handlers only touch the control channel. The runner picks the change up
//! and records it in the log once the current tick (if any) has finished.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    engine::runner::{SimControl, TickInterval},
    error::AppError,
    state::SharedState,
};

#[derive(Debug, Deserialize)]
pub struct IntervalRequest {
    pub interval_ms: u64,
}

fn control_body(control: SimControl, changed: bool) -> serde_json::Value {
    json!({
        "ok":          true,
        "running":     control.running,
        "interval_ms": control.interval.as_millis(),
        "changed":     changed,
    })
}

// ─── POST /api/sim/start ──────────────────────────────────────────────────────

pub async fn start(State(state): State<SharedState>) -> impl IntoResponse {
    let changed = state.set_running(true);
    if changed {
        info!("▶️  [CONTROL] Simulation started");
    }
    Json(control_body(state.control(), changed))
}

// ─── POST /api/sim/pause ──────────────────────────────────────────────────────

pub async fn pause(State(state): State<SharedState>) -> impl IntoResponse {
    let changed = state.set_running(false);
    if changed {
        info!("⏸️  [CONTROL] Simulation paused");
    }
    Json(control_body(state.control(), changed))
}

// ─── PUT /api/sim/interval ────────────────────────────────────────────────────

pub async fn set_interval(
    State(state): State<SharedState>,
    Json(req): Json<IntervalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let interval = TickInterval::try_from(req.interval_ms)?;
    let changed = state.set_interval(interval);
    if changed {
        info!(interval_ms = interval.as_millis(), "⏱️  [CONTROL] Tick interval changed");
    }
    Ok(Json(control_body(state.control(), changed)))
}

// ─── GET /api/sim/status ──────────────────────────────────────────────────────

pub async fn status(State(state): State<SharedState>) -> impl IntoResponse {
    let control = state.control();
    let (tick_count, trade_count) = {
        let sim = state.simulation.read().await;
        (sim.tick_count(), sim.trade_count())
    };
    Json(json!({
        "ok":          true,
        "running":     control.running,
        "interval_ms": control.interval.as_millis(),
        "intervals":   TickInterval::ALL.map(TickInterval::as_millis),
        "tick_count":  tick_count,
        "trade_count": trade_count,
    }))
}
