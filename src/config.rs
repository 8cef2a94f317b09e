//! # config
//!
//! Read service configuration from environment variables
//!
//! | Variable          | Default         | Description                              |
//! |-------------------|-----------------|------------------------------------------|
//! | `BIND_ADDR`       | `0.0.0.0:3000`  | Address Axum listens on                  |
//! | `SIM_SEED`        | *(entropy)*     | Seed for the price generator             |
//! | `SIM_INTERVAL_MS` | `1000`          | Initial tick interval (200/500/1000/2000)|
//! | `SIM_AUTOSTART`   | `false`         | Start RUNNING instead of PAUSED          |
//! | `SIM_DRIFT`       | `0.48`          | Generator drift (0.5 = unbiased walk)    |
//! | `SIM_INITIAL_USD` | `10000`         | Starting balance and PnL baseline        |

use std::net::SocketAddr;

use anyhow::{bail, Context};

use crate::engine::generator::GeneratorParams;
use crate::engine::runner::{SimControl, TickInterval};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub bind_addr:   SocketAddr,
    /// `None` seeds the generator from OS entropy.
    pub seed:        Option<u64>,
    pub interval:    TickInterval,
    pub autostart:   bool,
    pub drift:       f64,
    pub initial_usd: f64,
}

impl SimConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address, e.g. 0.0.0.0:3000")?;

        let seed = match var("SIM_SEED") {
            Some(v) => Some(v.parse().context("SIM_SEED must be an unsigned integer")?),
            None => None,
        };

        let interval_ms: u64 = var("SIM_INTERVAL_MS")
            .unwrap_or_else(|| "1000".to_string())
            .parse()
            .context("SIM_INTERVAL_MS must be a number")?;
        let interval = TickInterval::try_from(interval_ms).context("Invalid SIM_INTERVAL_MS")?;

        let autostart = var("SIM_AUTOSTART")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let drift: f64 = var("SIM_DRIFT")
            .unwrap_or_else(|| GeneratorParams::default().drift.to_string())
            .parse()
            .context("SIM_DRIFT must be a number")?;
        if !(0.0..=1.0).contains(&drift) {
            bail!("SIM_DRIFT must be within [0, 1], got {drift}");
        }

        let initial_usd: f64 = var("SIM_INITIAL_USD")
            .unwrap_or_else(|| "10000".to_string())
            .parse()
            .context("SIM_INITIAL_USD must be a number")?;
        if !initial_usd.is_finite() || initial_usd < 0.0 {
            bail!("SIM_INITIAL_USD must be a finite, non-negative amount, got {initial_usd}");
        }

        Ok(Self { bind_addr, seed, interval, autostart, drift, initial_usd })
    }

    /// Control values the runner starts with.
    pub fn initial_control(&self) -> SimControl {
        SimControl { running: self.autostart, interval: self.interval }
    }

    /// Deterministic, paused configuration.
    #[cfg(test)]
    pub fn for_tests(seed: u64) -> Self {
        Self {
            bind_addr:   ([127, 0, 0, 1], 0).into(),
            seed:        Some(seed),
            interval:    TickInterval::default(),
            autostart:   false,
            drift:       GeneratorParams::default().drift,
            initial_usd: 10_000.0,
        }
    }
}
