//! Live preview redraw loop.
//!
//! Redraws are paced to the configured refresh rate and stop as soon as the
//! shared stop flag is raised or the tick callback breaks.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use boothcam_common::clock::{PreviewClock, RateController};
use tokio::time::MissedTickBehavior;

/// Cloneable stop flag for a running redraw loop.
#[derive(Debug, Clone, Default)]
pub struct RedrawHandle {
    stop: Arc<AtomicBool>,
}

impl RedrawHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Summary of a finished redraw loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedrawStats {
    pub frames: u64,
    pub elapsed_secs: f64,
}

impl RedrawStats {
    pub fn fps(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            0.0
        } else {
            self.frames as f64 / self.elapsed_secs
        }
    }
}

#[derive(Debug)]
pub struct RedrawTask {
    rate: RateController,
    max_frames: Option<u64>,
}

impl RedrawTask {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            rate: RateController::new(rate_hz),
            max_frames: None,
        }
    }

    /// Stop after `frames` redraws.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Call `tick` with the frame index once per interval. A tick that
    /// breaks drew nothing and is not counted.
    pub async fn run<F>(&self, handle: &RedrawHandle, mut tick: F) -> RedrawStats
    where
        F: FnMut(u64) -> ControlFlow<()>,
    {
        let mut interval = tokio::time::interval(self.rate.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let clock = PreviewClock::start();

        let mut frames = 0u64;
        while !handle.is_stopped() && self.max_frames.map_or(true, |max| frames < max) {
            interval.tick().await;
            if handle.is_stopped() {
                break;
            }
            if tick(frames).is_break() {
                break;
            }
            frames += 1;
        }

        let stats = RedrawStats {
            frames,
            elapsed_secs: clock.elapsed_secs(),
        };
        tracing::debug!(frames, fps = stats.fps(), "Redraw loop finished");
        stats
    }
}
