//! Fleet Simulator CLI
//!
//! Runs the fleet simulation engine on a live timer and logs fleet
//! status and alerts to the console.

use anyhow::{bail, Result};
use clap::Parser;
use fleet_domain::{AlertThresholds, DroneStatus, Geofence};
use fleet_engine::{scheduler, EngineConfig, FleetEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fleet-simulator")]
#[command(about = "Simulate AeroExpress drone fleet operations")]
struct Args {
    /// Number of drones [env: FLEET_SIZE, default: 10]
    #[arg(short, long)]
    drones: Option<usize>,

    /// Tick interval in milliseconds [env: TICK_INTERVAL_MS, default: 2000]
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Total run duration in ticks
    #[arg(long, default_value = "300")]
    duration: u32,

    /// RNG seed for a replayable run [env: SIM_SEED]
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of the fleet to dispatch at start
    #[arg(long, default_value = "0.5")]
    activate: f64,

    /// Low battery alert threshold in percent [env: ALERT_BATTERY_PCT, default: 20]
    #[arg(long)]
    battery_threshold: Option<f64>,

    /// Overheat alert threshold in Celsius [env: ALERT_TEMPERATURE_C, default: 40]
    #[arg(long)]
    temp_threshold: Option<f64>,

    /// Geofence rectangle as x,y,width,height
    #[arg(long)]
    fence: Option<String>,
}

/// Merge CLI flags over the environment config: an explicit flag wins,
/// anything left unset falls back to env (which itself defaults).
fn resolve_config(args: &Args, env: EngineConfig) -> Result<EngineConfig> {
    Ok(EngineConfig {
        tick_interval_ms: args.tick_ms.unwrap_or(env.tick_interval_ms),
        fleet_size: args.drones.unwrap_or(env.fleet_size),
        thresholds: AlertThresholds::new(
            args.battery_threshold.unwrap_or(env.thresholds.battery_pct),
            args.temp_threshold.unwrap_or(env.thresholds.temperature_c),
        )?,
        seed: args.seed.or(env.seed),
        log_level: env.log_level,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args, EngineConfig::from_env())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("fleet_engine={}", config.log_level).parse()?),
        )
        .init();

    info!(
        "Starting fleet simulation: {} drones, tick {}ms, {} ticks",
        config.fleet_size, config.tick_interval_ms, args.duration
    );

    let engine = Arc::new(Mutex::new(FleetEngine::new(&config)));

    // Dispatch part of the fleet and install the fence before the
    // first tick fires.
    {
        let mut engine = engine.lock().await;

        if let Some(spec) = &args.fence {
            let fence = parse_fence(spec)?;
            engine.set_geofence(fence);
            info!(
                "Geofence armed: origin ({}, {}), {}x{}",
                fence.x, fence.y, fence.width, fence.height
            );
        }

        let dispatch = ((config.fleet_size as f64) * args.activate).round() as usize;
        let ids: Vec<String> = engine.store().drones()[..dispatch.min(config.fleet_size)]
            .iter()
            .map(|d| d.id.clone())
            .collect();
        for id in &ids {
            engine.set_status(id, DroneStatus::InTransit)?;
        }
        info!("Dispatched {} of {} drones", ids.len(), config.fleet_size);
    }

    let ticker = scheduler::spawn_ticker(
        engine.clone(),
        Duration::from_millis(config.tick_interval_ms),
    );

    for tick in 0..args.duration {
        sleep(Duration::from_millis(config.tick_interval_ms)).await;

        let engine = engine.lock().await;
        let summary = engine.store().summary();
        info!(
            "Tick {}/{} | Active: {}/{} | Avg battery: {:.1}% | Alerts: {}",
            tick + 1,
            args.duration,
            summary.active,
            summary.total,
            summary.average_battery_pct,
            summary.alert_count
        );

        for alert in engine.store().alerts() {
            warn!("  [{}] {}", alert.alert_type.as_str(), alert.message);
        }
    }

    ticker.shutdown().await;

    // Final fleet roll call
    let engine = engine.lock().await;
    info!("=== FINAL FLEET STATUS ===");
    for drone in engine.store().drones() {
        info!(
            "{} ({}) | {} | battery {:.1}% | health {:.1}% | {} samples",
            drone.id,
            drone.model,
            drone.status.as_str(),
            drone.battery,
            drone.health,
            engine.store().history().len(&drone.id)
        );
    }
    info!("Simulation complete");

    Ok(())
}

/// Parse a `x,y,width,height` fence spec.
fn parse_fence(spec: &str) -> Result<Geofence> {
    let parts: Vec<f64> = spec
        .split(',')
        .map(|p| p.trim().parse())
        .collect::<std::result::Result<_, _>>()?;
    if parts.len() != 4 {
        bail!("fence must be x,y,width,height, got {spec:?}");
    }
    Ok(Geofence {
        x: parts[0],
        y: parts[1],
        width: parts[2],
        height: parts[3],
    })
}
