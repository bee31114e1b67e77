//! Fleet state store - the single mutable home of the simulated world.

use fleet_domain::{
    AlertThresholds, DomainError, Drone, DroneStatus, DroneTelemetry, Geofence, Position, Result,
    SystemAlert, WORLD_MAX,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::history::TelemetryHistory;

/// Aggregate fleet readout for the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total: usize,
    pub active: usize,
    pub average_battery_pct: f64,
    pub alert_count: usize,
}

/// Holds the drone roster, the current tick's alerts, telemetry
/// history, and operator configuration. Only the tick processor
/// mutates drone records; everything else reads snapshots.
#[derive(Debug)]
pub struct FleetStore {
    drones: Vec<Drone>,
    alerts: Vec<SystemAlert>,
    history: TelemetryHistory,
    geofence: Option<Geofence>,
    thresholds: AlertThresholds,
}

impl FleetStore {
    /// Seed a fresh roster of idle drones scattered over the map.
    ///
    /// Tail numbers run `AEX-700` upward; every third unit is the
    /// heavy-lift airframe, the rest are standard couriers.
    pub fn spawn<R: Rng>(count: usize, rng: &mut R) -> Self {
        let drones = (0..count)
            .map(|i| Drone {
                id: format!("AEX-{}", 700 + i),
                model: if i % 3 == 0 {
                    "HeavyLift V2".to_string()
                } else {
                    "SkyHopper Pro".to_string()
                },
                status: DroneStatus::Idle,
                battery: 100.0,
                health: 100.0,
                estimated_flight_time_min: 60,
                position: Position::new(
                    rng.gen_range(0.0..WORLD_MAX),
                    rng.gen_range(0.0..WORLD_MAX),
                ),
                payload_kg: 0.0,
                order_id: None,
                telemetry: DroneTelemetry::default(),
            })
            .collect();

        Self {
            drones,
            alerts: Vec::new(),
            history: TelemetryHistory::new(),
            geofence: None,
            thresholds: AlertThresholds::default(),
        }
    }

    /// Current drone roster, in spawn order.
    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    /// Look up a single drone by id.
    pub fn drone(&self, id: &str) -> Option<&Drone> {
        self.drones.iter().find(|d| d.id == id)
    }

    /// Alerts raised by the most recent tick.
    pub fn alerts(&self) -> &[SystemAlert] {
        &self.alerts
    }

    /// Charting history per drone.
    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    /// Active geofence, if the operator has drawn one.
    pub fn geofence(&self) -> Option<Geofence> {
        self.geofence
    }

    /// Current alert thresholds.
    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
    }

    /// Aggregate readout for the fleet status panel.
    pub fn summary(&self) -> FleetSummary {
        let total = self.drones.len();
        let active = self.drones.iter().filter(|d| d.status.is_active()).count();
        let average_battery_pct = if total == 0 {
            0.0
        } else {
            self.drones.iter().map(|d| d.battery).sum::<f64>() / total as f64
        };
        FleetSummary {
            total,
            active,
            average_battery_pct,
            alert_count: self.alerts.len(),
        }
    }

    /// Replace the geofence atomically. Takes effect on the next tick.
    pub fn set_geofence(&mut self, fence: Geofence) {
        self.geofence = Some(fence);
    }

    /// Remove the geofence entirely.
    pub fn clear_geofence(&mut self) {
        self.geofence = None;
    }

    /// Update alert thresholds. Takes effect on the next tick.
    pub fn set_thresholds(&mut self, thresholds: AlertThresholds) {
        self.thresholds = thresholds;
    }

    /// Change a drone's operational status (dispatch, recall, etc).
    pub fn set_status(&mut self, id: &str, status: DroneStatus) -> Result<()> {
        let drone = self
            .drones
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DomainError::DroneNotFound(id.to_string()))?;
        drone.status = status;
        Ok(())
    }

    pub(crate) fn drones_mut(&mut self) -> &mut Vec<Drone> {
        &mut self.drones
    }

    pub(crate) fn history_mut(&mut self) -> &mut TelemetryHistory {
        &mut self.history
    }

    /// Replace the alert list with this tick's violations.
    pub(crate) fn replace_alerts(&mut self, alerts: Vec<SystemAlert>) {
        self.alerts = alerts;
    }
}
