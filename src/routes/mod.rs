//! # routes
//!
//! HTTP and WebSocket surface of the simulator.

pub mod control;
pub mod monitor;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

/// Build the full Axum router around `state`.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)   // Tighten in production!
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Control ──────────────────────────────────────────────────────────
        .route("/api/sim/start",             post(control::start))
        .route("/api/sim/pause",             post(control::pause))
        .route("/api/sim/interval",          put(control::set_interval))
        .route("/api/sim/status",            get(control::status))
        // ── Monitor ──────────────────────────────────────────────────────────
        .route("/api/monitor/snapshot",      get(monitor::get_snapshot))
        .route("/api/monitor/candles",       get(monitor::get_candles))
        .route("/api/monitor/trades",        get(monitor::get_trades))
        .route("/api/monitor/trades/:id",    get(monitor::get_trade))
        .route("/api/monitor/log",           get(monitor::get_log))
        .route("/ws/monitor",                get(monitor::ws_monitor))
        // ── Middleware ───────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
