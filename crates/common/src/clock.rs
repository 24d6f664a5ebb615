//! Clock and pacing utilities for the frame pipeline.
//!
//! Frames are stamped relative to a monotonic epoch recorded when the
//! video stream starts. This module provides:
//! - Capturing the epoch (with its wall-clock counterpart)
//! - Converting seconds to nanoseconds
//! - Rate limiting for periodic side work such as snapshots

use std::time::Instant;

/// A stream clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the stream started).
#[derive(Debug, Clone)]
pub struct StreamClock {
    /// The instant the stream started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl StreamClock {
    /// Create a new stream clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since stream start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Wall-clock time at stream start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }
}

/// Rate controller for periodic work inside the frame loop.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller that fires at most once per `interval_ns`.
    pub fn with_interval_ns(interval_ns: u64) -> Self {
        Self {
            target_interval_ns: interval_ns.max(1),
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = StreamClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_secs_to_ns_conversion() {
        assert_eq!(StreamClock::secs_to_ns(2.0), 2_000_000_000);
        assert_eq!(StreamClock::secs_to_ns(0.5), 500_000_000);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::with_interval_ns(2_000_000_000);
        assert!(ctrl.should_tick(0)); // first tick always fires
        assert!(!ctrl.should_tick(1_999_999_999));
        assert!(ctrl.should_tick(2_000_000_000));
        assert_eq!(ctrl.interval_ns(), 2_000_000_000);
    }

    #[test]
    fn test_rate_controller_zero_interval_does_not_stall() {
        let mut ctrl = RateController::with_interval_ns(0);
        assert_eq!(ctrl.interval_ns(), 1);
        assert!(ctrl.should_tick(0));
        assert!(ctrl.should_tick(1));
    }
}
