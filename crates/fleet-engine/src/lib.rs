//! # Fleet Engine
//!
//! Tick-driven simulation core behind the AeroExpress fleet dashboard.
//!
//! ## Features
//!
//! - Per-tick drone motion, battery/health degradation, and telemetry
//! - Rectangular geofence evaluation and pointer-driven fence drawing
//! - Threshold-based alerting recomputed wholesale each tick
//! - Bounded telemetry history for charting
//! - Cancellable timer loop for live operation; synchronous ticks for tests

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod alerts;
pub mod config;
pub mod geofence;
pub mod history;
pub mod scheduler;
pub mod store;
pub mod tick;

pub use config::EngineConfig;
pub use geofence::FenceDesigner;
pub use history::TelemetryHistory;
pub use scheduler::TickerHandle;
pub use store::FleetStore;
pub use tick::FleetEngine;
