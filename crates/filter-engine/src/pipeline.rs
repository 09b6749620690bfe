//! Filter pipeline: brightness, contrast, then the named filter.

use boothcam_scene_model::filter::{FilterKind, FilterSettings};
use image::{imageops, RgbaImage};

use crate::color::{GRAYSCALE, SEPIA};
use crate::tone::ToneCurve;

/// Gaussian standard deviation of the blur filter, in output pixels at scale 1.
pub const BLUR_SIGMA: f32 = 5.0;

/// A filter chain prepared for one set of settings.
///
/// Pure: the same input and settings always produce the same output, so the
/// preview and the captured still agree.
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    settings: FilterSettings,
    tone: ToneCurve,
    pixel_scale: f32,
}

impl FilterPipeline {
    pub fn new(settings: FilterSettings) -> Self {
        Self::with_scale(settings, 1.0)
    }

    /// `pixel_scale` converts the blur radius from layout pixels to target
    /// pixels (e.g. the device pixel ratio for a snapshot).
    pub fn with_scale(settings: FilterSettings, pixel_scale: f32) -> Self {
        let pixel_scale = if pixel_scale.is_finite() && pixel_scale > 0.0 {
            pixel_scale
        } else {
            1.0
        };
        Self {
            tone: ToneCurve::new(settings.brightness_pct(), settings.contrast_pct()),
            settings,
            pixel_scale,
        }
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    pub fn is_identity(&self) -> bool {
        self.settings.is_identity()
    }

    pub fn blur_sigma(&self) -> f32 {
        BLUR_SIGMA * self.pixel_scale
    }

    /// Filter `src` into a new image.
    pub fn apply(&self, src: &RgbaImage) -> RgbaImage {
        let mut out = src.clone();
        self.apply_in_place(&mut out);
        out
    }

    pub fn apply_in_place(&self, img: &mut RgbaImage) {
        if self.is_identity() {
            return;
        }
        self.tone.apply(img);
        match self.settings.kind {
            FilterKind::None => {}
            FilterKind::Grayscale => GRAYSCALE.apply(img),
            FilterKind::Sepia => SEPIA.apply(img),
            FilterKind::Blur => *img = imageops::blur(&*img, self.blur_sigma()),
        }
    }
}

/// Convenience for one-off filtering.
pub fn apply_filters(src: &RgbaImage, settings: &FilterSettings) -> RgbaImage {
    FilterPipeline::new(*settings).apply(src)
}
