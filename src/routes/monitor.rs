//! # routes::monitor
//!
//! **Monitor** endpoints: read-only views of the engine for dashboards.
//!
//! ## Endpoints
//!
//! | Method    | Path                         | Description                          |
//! |-----------|------------------------------|--------------------------------------|
//! | GET (WS)  | `/ws/monitor`                | SNAPSHOT frame, then live events     |
//! | GET       | `/api/monitor/snapshot`      | Full engine snapshot                 |
//! | GET       | `/api/monitor/candles`       | Candle window, oldest first          |
//! | GET       | `/api/monitor/trades`        | Trade history, newest first          |
//! | GET       | `/api/monitor/trades/:id`    | One trade still in the history       |
//! | GET       | `/api/monitor/log`           | Log history, newest first            |
//!
//! Every handler copies what it needs out of a single read lock, so a
//! response always describes one whole tick.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    Json,
};
use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::AppError, events::WsEvent, state::SharedState};

// ─── WebSocket Handler ────────────────────────────────────────────────────────

/// Upgrade to a WebSocket and forward every broadcast event as a text frame.
pub async fn ws_monitor(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    // subscribe before taking the snapshot so no tick falls in between
    let mut rx = state.broadcast_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    info!("🔌 WebSocket client connected");

    let snapshot = {
        let sim = state.simulation.read().await;
        WsEvent::Snapshot { snapshot: Box::new(sim.snapshot(state.control())) }.to_json()
    };

    if sender.send(Message::Text(snapshot)).await.is_err() {
        return;
    }

    // ── Event Loop ────────────────────────────────────────────────────────────
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(json_str) => {
                        if sender.send(Message::Text(json_str)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!("WS client lagged, skipped {n} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            result = receiver.next() => {
                match result {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("🔌 WebSocket client disconnected");
}

// ─── REST Monitoring Endpoints ────────────────────────────────────────────────

/// GET /api/monitor/snapshot
pub async fn get_snapshot(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.simulation.read().await.snapshot(state.control());
    let snapshot = serde_json::to_value(snapshot).context("Failed to serialise engine snapshot")?;
    Ok(Json(json!({
        "ok":       true,
        "snapshot": snapshot,
    })))
}

/// GET /api/monitor/candles
pub async fn get_candles(State(state): State<SharedState>) -> impl IntoResponse {
    let sim = state.simulation.read().await;
    Json(json!({
        "ok":      true,
        "count":   sim.candles().len(),
        "candles": sim.candles(),
    }))
}

/// GET /api/monitor/trades
pub async fn get_trades(State(state): State<SharedState>) -> impl IntoResponse {
    let sim = state.simulation.read().await;
    Json(json!({
        "ok":     true,
        "count":  sim.trades().len(),
        "trades": sim.trades(),
    }))
}

/// GET /api/monitor/trades/:id
///
/// Trades evicted from the bounded history are gone for good.
pub async fn get_trade(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sim = state.simulation.read().await;
    match sim.trades().iter().find(|t| t.id == id) {
        Some(trade) => Ok(Json(json!({ "ok": true, "trade": trade }))),
        None => Err(AppError::NotFound(format!("No trade {id} in recent history"))),
    }
}

/// GET /api/monitor/log
pub async fn get_log(State(state): State<SharedState>) -> impl IntoResponse {
    let sim = state.simulation.read().await;
    Json(json!({
        "ok":      true,
        "count":   sim.log().len(),
        "entries": sim.log(),
    }))
}
