//! Per-tick alert evaluation.

use chrono::{DateTime, Utc};
use fleet_domain::{AlertThresholds, AlertType, Drone, Geofence, SystemAlert};

use crate::geofence;

/// Evaluate one drone's post-update state against the fence and
/// thresholds. Conditions are checked in a fixed order and each
/// triggered condition contributes its own alert, so a single drone
/// can raise several alerts in one tick.
pub fn evaluate(
    drone: &Drone,
    fence: Option<&Geofence>,
    thresholds: AlertThresholds,
    now: DateTime<Utc>,
) -> Vec<SystemAlert> {
    let mut alerts = Vec::new();
    let active = drone.status.is_active();

    // Idle, charging, and maintenance units are exempt from the fence
    // even when geometrically outside it.
    if active && geofence::is_outside(fence, drone.position) {
        alerts.push(SystemAlert {
            drone_id: drone.id.clone(),
            timestamp: now,
            alert_type: AlertType::Geofence,
            message: format!(
                "Drone {} breached the geofence at ({:.1}, {:.1})",
                drone.id, drone.position.x, drone.position.y
            ),
        });
    }

    if active && drone.battery < thresholds.battery_pct {
        alerts.push(SystemAlert {
            drone_id: drone.id.clone(),
            timestamp: now,
            alert_type: AlertType::Battery,
            message: format!(
                "Drone {} battery low: {:.1}% (threshold {:.0}%)",
                drone.id, drone.battery, thresholds.battery_pct
            ),
        });
    }

    // Overheat is checked regardless of activity; a parked unit can
    // still be cooling down from a hot flight.
    if drone.telemetry.temperature_c > thresholds.temperature_c {
        alerts.push(SystemAlert {
            drone_id: drone.id.clone(),
            timestamp: now,
            alert_type: AlertType::Temperature,
            message: format!(
                "Drone {} overheating: {:.1}C (threshold {:.0}C)",
                drone.id, drone.telemetry.temperature_c, thresholds.temperature_c
            ),
        });
    }

    alerts
}
