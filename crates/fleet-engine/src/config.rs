//! Environment-based configuration for the simulation engine.

use std::env;

use fleet_domain::AlertThresholds;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tick cadence in milliseconds.
    pub tick_interval_ms: u64,

    /// Number of drones in the roster.
    pub fleet_size: usize,

    /// Alert thresholds at startup.
    pub thresholds: AlertThresholds,

    /// RNG seed; `None` draws from entropy.
    pub seed: Option<u64>,

    /// Logging level.
    pub log_level: String,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            tick_interval_ms: env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tick_interval_ms),

            fleet_size: env::var("FLEET_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fleet_size),

            thresholds: AlertThresholds {
                battery_pct: env::var("ALERT_BATTERY_PCT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.thresholds.battery_pct),
                temperature_c: env::var("ALERT_TEMPERATURE_C")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.thresholds.temperature_c),
            },

            seed: env::var("SIM_SEED").ok().and_then(|v| v.parse().ok()),

            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            fleet_size: 10,
            thresholds: AlertThresholds::default(),
            seed: None,
            log_level: "info".to_string(),
        }
    }
}
