//! Clock and pacing utilities for the live preview.
//!
//! Frames are stamped against a monotonic epoch taken when the preview
//! goes live. This module provides:
//! - The preview epoch and frame timestamps
//! - Wall-clock stamps for export file names
//! - A rate controller that paces redraws to the display refresh

use std::time::Instant;

/// A monotonic clock anchored to the moment the preview went live.
#[derive(Debug, Clone)]
pub struct PreviewClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl PreviewClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Nanoseconds elapsed since the preview went live.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Seconds elapsed since the preview went live.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at epoch.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// ISO 8601 basic-format UTC stamp with milliseconds, safe in file names
/// (`20261018T093015.123Z`).
pub fn file_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Paces a recurring callback to a target rate.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
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

    /// Forget the last tick so the next call fires immediately.
    pub fn reset(&mut self) {
        self.last_tick_ns = None;
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }

    /// Target interval as a `Duration`.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_nanos(self.target_interval_ns)
    }
}
