//! # Papertrade: Simulated BTC/USDT Paper-Trading Engine
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────┐   POST /api/sim/start|pause   ┌──────────────────────┐
//!  │  Dashboard   │ ─────────────────────────────▶│  watch<SimControl>   │
//!  │  (any UI)    │   PUT  /api/sim/interval      └──────────┬───────────┘
//!  └──────────────┘                                          │
//!         ▲                                                  ▼
//!         │                                       ┌──────────────────────┐
//!         │   GET /api/monitor/*                  │  Runner (tokio task) │
//!         │◀──────────────────────────────────────│  RwLock<Simulation>  │
//!         │   WS  /ws/monitor                     │  generator → signals │
//!         └───────────────────────────────────────│  → paper executor    │
//!                                                 └──────────────────────┘
//! ```
//!
//! See [`config`] for the environment variables. `RUST_LOG` tunes tracing.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod events;
mod models;
mod routes;
mod state;

use config::SimConfig;
use state::build_state;

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env (optional, CI/prod can use real env vars) ──────────────
    dotenvy::dotenv().ok();

    // ── 2. Initialise structured logging ─────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("papertrade=debug".parse()?)
            .add_directive("tower_http=info".parse()?))
        .init();

    info!(
        r#"

  ╔═══════════════════════════════════════════════╗
  ║        PAPERTRADE — Simulated BTC/USDT        ║
  ║        Rust + Axum  ·  Signals & Paper Fills  ║
  ╚═══════════════════════════════════════════════╝"#
    );

    // ── 3. Configuration ─────────────────────────────────────────────────────
    let config = SimConfig::from_env()?;
    info!(
        seed        = ?config.seed,
        interval_ms = config.interval.as_millis(),
        autostart   = config.autostart,
        drift       = config.drift,
        initial_usd = config.initial_usd,
        "⚙️  Configuration loaded"
    );

    // ── 4. Build shared state and spawn the runner ───────────────────────────
    let state = build_state(&config);
    tokio::spawn(engine::runner::run(state.clone()));

    // ── 5. Build the Axum router ─────────────────────────────────────────────
    let app = routes::router(state);

    info!(addr = ?config.bind_addr, "🚀 Papertrade server starting");

    // ── 6. Start the server ──────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
