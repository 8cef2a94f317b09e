//! # engine
//!
//! The simulation core. Everything here is synchronous except [`runner`],
//! which schedules ticks on the Tokio runtime.

pub mod executor;
pub mod generator;
pub mod indicators;
pub mod regime;
pub mod runner;
pub mod signals;
pub mod simulation;
