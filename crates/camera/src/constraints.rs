//! Stream constraints and mode negotiation.

use boothcam_common::config::{CameraDefaults, DimensionRange, Facing};
use boothcam_common::error::CameraError;
use serde::{Deserialize, Serialize};

/// A resolution a camera can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraMode {
    pub width: u32,
    pub height: u32,
}

impl CameraMode {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for CameraMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What a caller asks of the camera.
///
/// `min`/`max` bounds are hard; `ideal` values and the aspect ratio only
/// rank the modes that pass the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub width: DimensionRange,
    pub height: DimensionRange,
    pub facing: Facing,
    pub aspect_ratio: Option<f64>,
}

impl MediaConstraints {
    /// The rich request used by the first rungs of the fallback ladder.
    pub fn rich(defaults: &CameraDefaults, facing: Facing) -> Self {
        Self {
            width: defaults.width,
            height: defaults.height,
            facing,
            aspect_ratio: Some(defaults.aspect_ratio),
        }
    }

    /// The least constrained request: any size, preferring `width`x`height`.
    pub fn minimal(width: u32, height: u32, facing: Facing) -> Self {
        Self {
            width: DimensionRange::new(0, width, u32::MAX),
            height: DimensionRange::new(0, height, u32::MAX),
            facing,
            aspect_ratio: None,
        }
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn accepts(&self, mode: &CameraMode) -> bool {
        self.width.contains(mode.width) && self.height.contains(mode.height)
    }

    /// Pick the supported mode closest to the ideals.
    ///
    /// Fails only when no mode satisfies the hard bounds.
    pub fn negotiate(&self, modes: &[CameraMode]) -> Result<CameraMode, CameraError> {
        modes
            .iter()
            .filter(|mode| self.accepts(mode))
            .min_by(|a, b| {
                self.distance(a)
                    .total_cmp(&self.distance(b))
                    .then_with(|| b.area().cmp(&a.area()))
            })
            .copied()
            .ok_or_else(|| {
                let offered = modes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                CameraError::unsupported(format!(
                    "width {}..{}, height {}..{}; device offers [{offered}]",
                    self.width.min, self.width.max, self.height.min, self.height.max
                ))
            })
    }

    /// Relative distance from the ideals; size first, aspect ratio as a tiebreaker weight.
    fn distance(&self, mode: &CameraMode) -> f64 {
        let rel = |value: u32, ideal: u32| {
            if ideal == 0 {
                0.0
            } else {
                (value as f64 - ideal as f64).abs() / ideal as f64
            }
        };
        let size = rel(mode.width, self.width.ideal) + rel(mode.height, self.height.ideal);
        let aspect = self
            .aspect_ratio
            .filter(|ar| *ar > 0.0)
            .map(|ar| (mode.aspect_ratio() - ar).abs() / ar)
            .unwrap_or(0.0);
        size + 0.5 * aspect
    }
}
