//! Bounded per-drone telemetry history for charting.

use std::collections::HashMap;
use std::collections::VecDeque;

use fleet_domain::{TelemetrySample, TELEMETRY_HISTORY_LIMIT};

/// Sliding window of telemetry samples per drone. Insertion order is
/// chronological; the oldest sample is evicted once a drone's window
/// reaches [`TELEMETRY_HISTORY_LIMIT`].
#[derive(Debug, Default)]
pub struct TelemetryHistory {
    windows: HashMap<String, VecDeque<TelemetrySample>>,
}

impl TelemetryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample for a drone, trimming the window from the front.
    pub fn record(&mut self, drone_id: &str, sample: TelemetrySample) {
        let window = self.windows.entry(drone_id.to_string()).or_default();
        window.push_back(sample);
        while window.len() > TELEMETRY_HISTORY_LIMIT {
            window.pop_front();
        }
    }

    /// Samples for a drone, oldest first. A drone that has never been
    /// sampled yields an empty iterator, not an error.
    pub fn samples(&self, drone_id: &str) -> impl Iterator<Item = &TelemetrySample> {
        self.windows.get(drone_id).into_iter().flatten()
    }

    /// Number of samples currently held for a drone.
    pub fn len(&self, drone_id: &str) -> usize {
        self.windows.get(drone_id).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, drone_id: &str) -> bool {
        self.len(drone_id) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(signal: f64) -> TelemetrySample {
        TelemetrySample {
            time: Utc::now(),
            signal,
            temp: 25.0,
            alt: 0.0,
        }
    }

    #[test]
    fn test_unknown_drone_is_empty() {
        let history = TelemetryHistory::new();
        assert_eq!(history.samples("AEX-700").count(), 0);
        assert!(history.is_empty("AEX-700"));
    }

    #[test]
    fn test_window_caps_at_limit_fifo() {
        let mut history = TelemetryHistory::new();
        for i in 0..40 {
            history.record("AEX-700", sample(f64::from(i)));
        }

        assert_eq!(history.len("AEX-700"), TELEMETRY_HISTORY_LIMIT);

        // The first ten samples were evicted; the window starts at 10.
        let first = history.samples("AEX-700").next().unwrap();
        assert!((first.signal - 10.0).abs() < f64::EPSILON);
        let last = history.samples("AEX-700").last().unwrap();
        assert!((last.signal - 39.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_windows_are_per_drone() {
        let mut history = TelemetryHistory::new();
        history.record("AEX-700", sample(1.0));
        history.record("AEX-701", sample(2.0));
        assert_eq!(history.len("AEX-700"), 1);
        assert_eq!(history.len("AEX-701"), 1);
    }
}
