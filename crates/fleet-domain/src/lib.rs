//! # AeroExpress Fleet - Domain Model
//!
//! Core domain entities, value objects, and enums for the drone fleet
//! dashboard. These types are the single source of truth across the
//! simulation engine and the rendering layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// WORLD CONSTANTS
// =============================================================================

/// Upper bound of the normalized map plane on both axes (percent of viewport).
pub const WORLD_MAX: f64 = 95.0;

/// Cruising altitude ceiling in meters.
pub const CRUISING_ALTITUDE_M: f64 = 120.0;

/// Ground-level ambient temperature in Celsius.
pub const AMBIENT_TEMP_C: f64 = 25.0;

/// Hottest the airframe is allowed to report.
pub const MAX_TEMP_C: f64 = 45.0;

/// Trailing telemetry samples retained per drone for charting.
pub const TELEMETRY_HISTORY_LIMIT: usize = 30;

/// Minimum geofence edge length for a drawn rectangle to be committed.
pub const MIN_FENCE_EDGE: f64 = 2.0;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Position on the normalized map plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into the world bounds. Idempotent.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, WORLD_MAX),
            y: self.y.clamp(0.0, WORLD_MAX),
        }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Live telemetry readings carried on a drone record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneTelemetry {
    /// Link quality in percent.
    pub signal_strength: f64,
    /// Airframe temperature in Celsius.
    pub temperature_c: f64,
    /// Altitude above ground in meters.
    pub altitude_m: f64,
}

impl Default for DroneTelemetry {
    fn default() -> Self {
        Self {
            signal_strength: 100.0,
            temperature_c: AMBIENT_TEMP_C,
            altitude_m: 0.0,
        }
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Drone operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DroneStatus {
    Idle,
    InTransit,
    Delivering,
    Returning,
    Charging,
    Maintenance,
}

impl DroneStatus {
    /// Whether the drone is airborne and subject to motion, battery
    /// drain, and geofence checks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InTransit | Self::Delivering | Self::Returning)
    }

    /// Display label matching the operator dashboard.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::InTransit => "In-Transit",
            Self::Delivering => "Delivering",
            Self::Returning => "Returning",
            Self::Charging => "Charging",
            Self::Maintenance => "Maintenance",
        }
    }
}

/// Alert categories raised by the tick evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Geofence,
    Battery,
    Temperature,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Geofence => "geofence",
            Self::Battery => "battery",
            Self::Temperature => "temperature",
        }
    }
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// Drone entity - one per fleet unit, identified by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub id: String,
    pub model: String,
    pub status: DroneStatus,
    /// Battery charge in percent.
    pub battery: f64,
    /// Airframe health in percent.
    pub health: f64,
    /// Minutes of flight remaining at current charge.
    pub estimated_flight_time_min: u32,
    pub position: Position,
    /// Cargo mass in kilograms.
    pub payload_kg: f64,
    /// Opaque reference to an in-progress delivery, if any.
    pub order_id: Option<String>,
    pub telemetry: DroneTelemetry,
}

/// Operator-defined rectangular permitted-operation zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geofence {
    /// Whether a position lies inside (or on the edge of) the fence.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.x <= self.x + self.width
            && pos.y >= self.y
            && pos.y <= self.y + self.height
    }
}

/// One alert raised during a tick. The alert list is recomputed
/// wholesale every tick and never accumulates across ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAlert {
    pub drone_id: String,
    pub timestamp: DateTime<Utc>,
    pub alert_type: AlertType,
    pub message: String,
}

/// One charted telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time: DateTime<Utc>,
    pub signal: f64,
    pub temp: f64,
    pub alt: f64,
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Operator-editable alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Low-battery warning level in percent.
    pub battery_pct: f64,
    /// Overheat warning level in Celsius.
    pub temperature_c: f64,
}

impl AlertThresholds {
    pub fn new(battery_pct: f64, temperature_c: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&battery_pct) {
            return Err(DomainError::InvalidThreshold {
                field: "battery_pct",
                value: battery_pct,
            });
        }
        Ok(Self {
            battery_pct,
            temperature_c,
        })
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            battery_pct: 20.0,
            temperature_c: 40.0,
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("drone not found: {0}")]
    DroneNotFound(String),

    #[error("invalid threshold {field}: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_is_idempotent() {
        let p = Position::new(120.0, -3.0).clamped();
        assert_eq!(p, Position::new(95.0, 0.0));
        assert_eq!(p.clamped(), p);
    }

    #[test]
    fn test_active_statuses() {
        assert!(DroneStatus::InTransit.is_active());
        assert!(DroneStatus::Delivering.is_active());
        assert!(DroneStatus::Returning.is_active());
        assert!(!DroneStatus::Idle.is_active());
        assert!(!DroneStatus::Charging.is_active());
        assert!(!DroneStatus::Maintenance.is_active());
    }

    #[test]
    fn test_fence_contains_edges() {
        let fence = Geofence {
            x: 5.0,
            y: 5.0,
            width: 90.0,
            height: 90.0,
        };
        assert!(fence.contains(Position::new(5.0, 5.0)));
        assert!(fence.contains(Position::new(95.0, 95.0)));
        assert!(!fence.contains(Position::new(2.0, 50.0)));
    }

    #[test]
    fn test_threshold_validation() {
        assert!(AlertThresholds::new(20.0, 40.0).is_ok());
        assert!(AlertThresholds::new(150.0, 40.0).is_err());
    }

    #[test]
    fn test_alert_type_wire_format() {
        let json = serde_json::to_string(&AlertType::Geofence).unwrap();
        assert_eq!(json, "\"geofence\"");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(DroneStatus::InTransit.as_str(), "In-Transit");
        assert_eq!(DroneStatus::Idle.as_str(), "Idle");
    }
}
