//! Cancellable repeating tick source.
//!
//! Production runs the engine off a tokio interval; tests drive
//! [`FleetEngine::tick`](crate::FleetEngine::tick) synchronously and
//! never touch this module.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::tick::FleetEngine;

/// Handle to a running ticker. Prefer [`shutdown`](TickerHandle::shutdown)
/// to let an in-flight tick finish; dropping the handle aborts the
/// ticker task outright, so a leaked handle still stops mutation.
#[derive(Debug)]
pub struct TickerHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stop the ticker and wait for the in-flight tick to finish. No
    /// further mutation happens after this returns.
    pub async fn shutdown(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// Spawn a repeating tick task at a fixed interval. Ticks never
/// overlap: each one completes under the engine lock before the next
/// interval fires, and a delayed tick pushes the schedule back rather
/// than bursting.
pub fn spawn_ticker<R>(engine: Arc<Mutex<FleetEngine<R>>>, period: Duration) -> TickerHandle
where
    R: Rng + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    engine.lock().await.tick();
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("ticker stopped");
    });

    TickerHandle {
        stop_tx,
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn test_ticker_runs_and_stops() {
        let config = EngineConfig {
            fleet_size: 2,
            ..EngineConfig::default()
        };
        let engine: Arc<Mutex<FleetEngine<StdRng>>> =
            Arc::new(Mutex::new(FleetEngine::seeded(&config, 42)));

        let handle = spawn_ticker(engine.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown().await;

        let ticks = engine.lock().await.ticks();
        assert!(ticks >= 2, "expected at least 2 ticks, got {ticks}");

        // No further mutation after shutdown.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(engine.lock().await.ticks(), ticks);
    }

    #[tokio::test]
    async fn test_dropped_handle_aborts_ticker() {
        let config = EngineConfig {
            fleet_size: 1,
            ..EngineConfig::default()
        };
        let engine: Arc<Mutex<FleetEngine<StdRng>>> =
            Arc::new(Mutex::new(FleetEngine::seeded(&config, 7)));

        let handle = spawn_ticker(engine.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(handle);

        // Give the abort a moment to land, then confirm mutation stopped.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let ticks = engine.lock().await.ticks();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(engine.lock().await.ticks(), ticks);
    }
}
