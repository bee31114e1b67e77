//! Tick processor - advances the simulated world by one step.

use chrono::Utc;
use fleet_domain::{
    AlertThresholds, DroneStatus, Geofence, Position, Result, SystemAlert, TelemetrySample,
    AMBIENT_TEMP_C, CRUISING_ALTITUDE_M, MAX_TEMP_C,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::alerts;
use crate::config::EngineConfig;
use crate::geofence::FenceDesigner;
use crate::store::FleetStore;

/// Random-walk intensity: each axis moves by a uniform delta in
/// [-intensity/2, intensity/2] per tick, i.e. [-2, 2].
const WALK_INTENSITY: f64 = 4.0;
/// Battery percent drained per active tick.
const BATTERY_DRAIN: f64 = 0.2;
/// Upper bound of the random health decay per active tick.
const HEALTH_DECAY_MAX: f64 = 0.01;
/// Climb rate in meters per tick, plus jitter.
const CLIMB_RATE: f64 = 5.0;
const CLIMB_JITTER: f64 = 2.0;
/// Descent rate in meters per tick while grounded or landing.
const DESCENT_RATE: f64 = 10.0;
/// Heating rate in Celsius per active tick, plus jitter.
const HEAT_RATE: f64 = 0.5;
const HEAT_JITTER: f64 = 0.2;
/// Cooling rate in Celsius per inactive tick.
const COOL_RATE: f64 = 0.5;
/// Signal loss in percent per unit of distance from base at (0, 0).
const SIGNAL_FALLOFF: f64 = 0.3;
/// Upper bound of per-tick signal noise in percent.
const SIGNAL_NOISE: f64 = 5.0;

/// The simulation engine: fleet state plus the tick driver that
/// mutates it. Generic over the random source so tests can seed it.
#[derive(Debug)]
pub struct FleetEngine<R: Rng = StdRng> {
    store: FleetStore,
    designer: FenceDesigner,
    rng: R,
    ticks: u64,
}

impl FleetEngine<StdRng> {
    /// Production engine with a non-deterministic random source
    /// (or a seeded one when the config pins a seed).
    pub fn new(config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Deterministic engine for tests and replayable runs.
    pub fn seeded(config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FleetEngine<R> {
    /// Build an engine around an injected random source.
    pub fn with_rng(config: &EngineConfig, mut rng: R) -> Self {
        let mut store = FleetStore::spawn(config.fleet_size, &mut rng);
        store.set_thresholds(config.thresholds);
        Self {
            store,
            designer: FenceDesigner::new(),
            rng,
            ticks: 0,
        }
    }

    /// Read-only view of the fleet state for the rendering layer.
    pub fn store(&self) -> &FleetStore {
        &self.store
    }

    /// Ticks processed since start.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // -------------------------------------------------------------------------
    // Inbound commands (operator / rendering layer)
    // -------------------------------------------------------------------------

    /// Update alert thresholds; applies from the next tick.
    pub fn set_thresholds(&mut self, thresholds: AlertThresholds) {
        self.store.set_thresholds(thresholds);
    }

    /// Install a geofence directly (scenario setup, saved fences).
    pub fn set_geofence(&mut self, fence: Geofence) {
        self.store.set_geofence(fence);
    }

    /// Remove the geofence.
    pub fn clear_geofence(&mut self) {
        self.store.clear_geofence();
    }

    /// Change a drone's operational status.
    pub fn set_status(&mut self, id: &str, status: DroneStatus) -> Result<()> {
        self.store.set_status(id, status)
    }

    /// Fence drawing: operator requested a new fence.
    pub fn begin_fence_define(&mut self) {
        self.designer.begin_define();
    }

    /// Fence drawing: pointer pressed on the map.
    pub fn fence_pointer_down(&mut self, pos: Position) {
        self.designer.pointer_down(pos);
    }

    /// Fence drawing: pointer dragged.
    pub fn fence_pointer_move(&mut self, pos: Position) {
        self.designer.pointer_move(pos);
    }

    /// Fence drawing: pointer released. Commits the drag into the
    /// store if it clears the minimum size, otherwise the prior fence
    /// is retained.
    pub fn fence_pointer_up(&mut self) {
        if let Some(fence) = self.designer.pointer_up() {
            self.store.set_geofence(fence);
        }
    }

    /// Fence drawing: pointer left the map mid-drag. Same as release.
    pub fn fence_pointer_leave(&mut self) {
        if let Some(fence) = self.designer.pointer_leave() {
            self.store.set_geofence(fence);
        }
    }

    /// Provisional drag rectangle for rendering feedback.
    pub fn fence_designer(&self) -> &FenceDesigner {
        &self.designer
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advance every drone by one simulation step, then rebuild the
    /// alert list and append telemetry history. Fence and thresholds
    /// are read once at the start of the tick.
    pub fn tick(&mut self) {
        let now = Utc::now();
        let fence = self.store.geofence();
        let thresholds = self.store.thresholds();

        let mut alerts: Vec<SystemAlert> = Vec::new();
        let mut samples: Vec<(String, TelemetrySample)> = Vec::new();

        for drone in self.store.drones_mut().iter_mut() {
            if drone.status.is_active() {
                drone.position.x += (self.rng.r#gen::<f64>() - 0.5) * WALK_INTENSITY;
                drone.position.y += (self.rng.r#gen::<f64>() - 0.5) * WALK_INTENSITY;

                drone.battery = (drone.battery - BATTERY_DRAIN).max(0.0);
                drone.health =
                    (drone.health - self.rng.gen_range(0.0..=HEALTH_DECAY_MAX)).max(0.0);

                drone.telemetry.altitude_m = (drone.telemetry.altitude_m
                    + CLIMB_RATE
                    + self.rng.gen_range(0.0..=CLIMB_JITTER))
                .min(CRUISING_ALTITUDE_M);
                drone.telemetry.temperature_c = (drone.telemetry.temperature_c
                    + HEAT_RATE
                    + self.rng.gen_range(0.0..=HEAT_JITTER))
                .min(MAX_TEMP_C);

                if drone.order_id.is_none() {
                    drone.order_id = Some(format!("ORD-{}", self.rng.gen_range(100..1000)));
                }
            } else {
                drone.telemetry.altitude_m =
                    (drone.telemetry.altitude_m - DESCENT_RATE).max(0.0);
                drone.telemetry.temperature_c =
                    (drone.telemetry.temperature_c - COOL_RATE).max(AMBIENT_TEMP_C);

                if drone.status == DroneStatus::Idle {
                    drone.order_id = None;
                }
            }

            drone.position = drone.position.clamped();

            // Signal degrades with distance from the base station at the
            // map origin, regardless of activity.
            let distance = drone.position.distance_to(Position::default());
            drone.telemetry.signal_strength = (100.0
                - SIGNAL_FALLOFF * distance
                - self.rng.gen_range(0.0..=SIGNAL_NOISE))
            .clamp(0.0, 100.0);

            drone.estimated_flight_time_min = (drone.battery / 100.0 * 60.0).floor() as u32;

            alerts.extend(alerts::evaluate(drone, fence.as_ref(), thresholds, now));
            samples.push((
                drone.id.clone(),
                TelemetrySample {
                    time: now,
                    signal: drone.telemetry.signal_strength,
                    temp: drone.telemetry.temperature_c,
                    alt: drone.telemetry.altitude_m,
                },
            ));
        }

        // This tick's violations replace the previous list outright.
        let alert_count = alerts.len();
        self.store.replace_alerts(alerts);

        for (id, sample) in samples {
            self.store.history_mut().record(&id, sample);
        }

        self.ticks += 1;
        debug!(tick = self.ticks, alerts = alert_count, "tick complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_domain::{AlertType, WORLD_MAX};

    fn engine(fleet_size: usize, seed: u64) -> FleetEngine<StdRng> {
        let config = EngineConfig {
            fleet_size,
            ..EngineConfig::default()
        };
        FleetEngine::seeded(&config, seed)
    }

    #[test]
    fn test_bounds_hold_over_many_ticks() {
        let mut engine = engine(6, 42);
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        engine.set_status("AEX-701", DroneStatus::Delivering).unwrap();
        engine.set_status("AEX-702", DroneStatus::Returning).unwrap();
        engine.set_status("AEX-703", DroneStatus::Charging).unwrap();

        for _ in 0..500 {
            engine.tick();
            for drone in engine.store().drones() {
                assert!((0.0..=100.0).contains(&drone.battery), "battery out of range");
                assert!((0.0..=100.0).contains(&drone.health), "health out of range");
                assert!(
                    (AMBIENT_TEMP_C..=MAX_TEMP_C).contains(&drone.telemetry.temperature_c),
                    "temperature out of range"
                );
                assert!(
                    (0.0..=CRUISING_ALTITUDE_M).contains(&drone.telemetry.altitude_m),
                    "altitude out of range"
                );
                assert!(
                    (0.0..=100.0).contains(&drone.telemetry.signal_strength),
                    "signal out of range"
                );
                assert!((0.0..=WORLD_MAX).contains(&drone.position.x));
                assert!((0.0..=WORLD_MAX).contains(&drone.position.y));
            }
        }
    }

    #[test]
    fn test_active_drone_drains_and_climbs() {
        let mut engine = engine(1, 1);
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        engine.tick();

        let drone = engine.store().drone("AEX-700").unwrap();
        assert!((drone.battery - 99.8).abs() < 1e-9);
        assert!(drone.health < 100.0);
        assert!(drone.telemetry.altitude_m >= 5.0);
        assert!(drone.telemetry.temperature_c > AMBIENT_TEMP_C);
        assert_eq!(drone.estimated_flight_time_min, 59);
    }

    #[test]
    fn test_idle_drone_keeps_battery_and_cools() {
        let mut engine = engine(1, 1);
        // Fly for a while, then recall.
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        for _ in 0..10 {
            engine.tick();
        }
        engine.set_status("AEX-700", DroneStatus::Idle).unwrap();
        let battery_before = engine.store().drone("AEX-700").unwrap().battery;
        let altitude_before = engine.store().drone("AEX-700").unwrap().telemetry.altitude_m;

        engine.tick();
        let drone = engine.store().drone("AEX-700").unwrap();
        assert_eq!(drone.battery, battery_before);
        assert!(drone.telemetry.altitude_m < altitude_before);
    }

    #[test]
    fn test_order_assigned_while_active_and_cleared_on_idle() {
        let mut engine = engine(1, 3);
        assert!(engine.store().drone("AEX-700").unwrap().order_id.is_none());

        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        engine.tick();
        let order = engine.store().drone("AEX-700").unwrap().order_id.clone();
        assert!(order.is_some());

        // The same order rides along across ticks.
        engine.tick();
        assert_eq!(engine.store().drone("AEX-700").unwrap().order_id, order);

        // Charging does not clear it; only Idle does.
        engine.set_status("AEX-700", DroneStatus::Charging).unwrap();
        engine.tick();
        assert_eq!(engine.store().drone("AEX-700").unwrap().order_id, order);

        engine.set_status("AEX-700", DroneStatus::Idle).unwrap();
        engine.tick();
        assert!(engine.store().drone("AEX-700").unwrap().order_id.is_none());
    }

    #[test]
    fn test_position_outside_world_is_clamped() {
        let mut engine = engine(1, 5);
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        engine.store.drones_mut()[0].position = Position::new(100.0, 100.0);

        engine.tick();
        let pos = engine.store().drone("AEX-700").unwrap().position;
        assert_eq!(pos.x, WORLD_MAX);
        assert_eq!(pos.y, WORLD_MAX);
    }

    #[test]
    fn test_low_battery_alert_scenario() {
        let mut engine = engine(1, 9);
        engine.store.drones_mut()[0].battery = 19.0;
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();

        engine.tick();
        let alerts = engine.store().alerts();
        assert!(alerts.iter().any(|a| a.alert_type == AlertType::Battery
            && a.drone_id == "AEX-700"));

        // Same battery level but parked: no alert.
        let mut engine = engine_idle_low_battery();
        engine.tick();
        assert!(engine.store().alerts().is_empty());
    }

    fn engine_idle_low_battery() -> FleetEngine<StdRng> {
        let mut e = engine(1, 9);
        e.store.drones_mut()[0].battery = 19.0;
        e
    }

    #[test]
    fn test_geofence_alert_fires_and_clears() {
        let mut engine = engine(1, 11);
        engine.set_geofence(Geofence {
            x: 5.0,
            y: 5.0,
            width: 90.0,
            height: 90.0,
        });
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        engine.store.drones_mut()[0].position = Position::new(2.0, 50.0);

        engine.tick();
        assert!(engine
            .store()
            .alerts()
            .iter()
            .any(|a| a.alert_type == AlertType::Geofence));

        // Move the drone well inside the fence; the old alert must not linger.
        engine.store.drones_mut()[0].position = Position::new(50.0, 50.0);
        engine.tick();
        assert!(engine
            .store()
            .alerts()
            .iter()
            .all(|a| a.alert_type != AlertType::Geofence));
    }

    #[test]
    fn test_alert_list_is_replaced_each_tick() {
        let mut engine = engine(2, 13);
        engine.store.drones_mut()[0].battery = 10.0;
        engine.set_status("AEX-700", DroneStatus::Delivering).unwrap();

        engine.tick();
        assert_eq!(engine.store().alerts().len(), 1);

        // Refuel between ticks; the list must come back empty, not grow.
        engine.store.drones_mut()[0].battery = 90.0;
        engine.tick();
        assert!(engine.store().alerts().is_empty());
    }

    #[test]
    fn test_history_recorded_for_every_drone() {
        let mut engine = engine(3, 17);
        for _ in 0..40 {
            engine.tick();
        }
        for drone in engine.store().drones() {
            assert_eq!(
                engine.store().history().len(&drone.id),
                fleet_domain::TELEMETRY_HISTORY_LIMIT
            );
        }
    }

    #[test]
    fn test_threshold_change_applies_next_tick() {
        let mut engine = engine(1, 19);
        engine.set_status("AEX-700", DroneStatus::InTransit).unwrap();
        engine.store.drones_mut()[0].battery = 50.0;

        engine.tick();
        assert!(engine.store().alerts().is_empty());

        engine.set_thresholds(AlertThresholds::new(60.0, 40.0).unwrap());
        engine.tick();
        assert!(engine
            .store()
            .alerts()
            .iter()
            .any(|a| a.alert_type == AlertType::Battery));
    }

    #[test]
    fn test_fence_draw_commits_through_engine() {
        let mut engine = engine(1, 23);
        engine.begin_fence_define();
        engine.fence_pointer_down(Position::new(10.0, 10.0));
        engine.fence_pointer_move(Position::new(20.0, 20.0));
        engine.fence_pointer_up();

        let fence = engine.store().geofence().unwrap();
        assert_eq!(fence.width, 10.0);

        // A 1x1 drag must leave the committed fence untouched.
        engine.begin_fence_define();
        engine.fence_pointer_down(Position::new(30.0, 30.0));
        engine.fence_pointer_move(Position::new(31.0, 31.0));
        engine.fence_pointer_up();
        assert_eq!(engine.store().geofence().unwrap().x, 10.0);
    }
}
