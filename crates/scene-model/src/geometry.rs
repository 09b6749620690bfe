//! Geometry for placing overlays on a base frame.
//!
//! Placement is stored as fractions of the base dimensions (`FractionalRect`)
//! and only turned into pixels against a concrete target size, so the same
//! layout reproduces at preview resolution and at capture resolution.

use serde::{Deserialize, Serialize};

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_u32(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// Width divided by height (0 for degenerate sizes).
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Scale both axes by the same factor.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Round to whole pixels, never below 1x1.
    pub fn to_pixels(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// A rectangle in pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Largest rect with `native`'s aspect ratio that fits inside `self`,
    /// centered ("object-fit: contain").
    pub fn fit_contain(&self, native: Size) -> PixelRect {
        if native.is_empty() {
            return PixelRect::new(self.x + self.w / 2.0, self.y + self.h / 2.0, 0.0, 0.0);
        }
        let scale = (self.w / native.width).min(self.h / native.height);
        let w = native.width * scale;
        let h = native.height * scale;
        PixelRect::new(self.x + (self.w - w) / 2.0, self.y + (self.h - h) / 2.0, w, h)
    }

    /// Express this rect as fractions of `base`.
    pub fn to_fractional(&self, base: Size) -> FractionalRect {
        FractionalRect {
            x: self.x / base.width,
            y: self.y / base.height,
            w: self.w / base.width,
            h: self.h / base.height,
        }
    }
}

/// A rectangle expressed as fractions of a base size.
///
/// `(0.0, 0.0)` is the top-left and `(1.0, 1.0)` the bottom-right of the base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl FractionalRect {
    pub const FULL: FractionalRect = FractionalRect {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Resolve against a concrete target size.
    pub fn to_pixels(&self, target: Size) -> PixelRect {
        PixelRect {
            x: self.x * target.width,
            y: self.y * target.height,
            w: self.w * target.width,
            h: self.h * target.height,
        }
    }
}

/// Maps preview-container coordinates to output-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionContext {
    pub container: Size,
    pub output: Size,
}

impl CompositionContext {
    pub fn new(container: Size, output: Size) -> Self {
        Self { container, output }
    }

    pub fn scale_x(&self) -> f64 {
        self.output.width / self.container.width
    }

    pub fn scale_y(&self) -> f64 {
        self.output.height / self.container.height
    }

    /// Convert a container-space rect into output pixels by way of fractions.
    pub fn container_to_output(&self, rect: &PixelRect) -> PixelRect {
        rect.to_fractional(self.container).to_pixels(self.output)
    }
}

/// Source rect of `frame` that fills `target` without letterboxing
/// ("object-fit: cover"), centered.
pub fn cover_crop(frame: Size, target: Size) -> PixelRect {
    if frame.is_empty() || target.is_empty() {
        return PixelRect::new(0.0, 0.0, frame.width, frame.height);
    }
    let scale = (target.width / frame.width).max(target.height / frame.height);
    let w = target.width / scale;
    let h = target.height / scale;
    PixelRect::new((frame.width - w) / 2.0, (frame.height - h) / 2.0, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_contain_tall_image_in_square_box() {
        let boxed = PixelRect::new(0.0, 0.0, 100.0, 100.0);
        let fitted = boxed.fit_contain(Size::new(50.0, 200.0));
        assert!((fitted.h - 100.0).abs() < 1e-9);
        assert!((fitted.w - 25.0).abs() < 1e-9);
        assert!((fitted.x - 37.5).abs() < 1e-9);
        assert_eq!(fitted.y, 0.0);
    }

    #[test]
    fn test_fractional_roundtrip() {
        let base = Size::new(360.0, 640.0);
        let rect = PixelRect::new(36.0, 64.0, 72.0, 128.0);
        let frac = rect.to_fractional(base);
        assert!((frac.x - 0.1).abs() < 1e-9);
        assert!((frac.h - 0.2).abs() < 1e-9);
        assert_eq!(frac.to_pixels(base), rect);
    }

    #[test]
    fn test_composition_context_scales() {
        let ctx = CompositionContext::new(Size::new(360.0, 640.0), Size::new(720.0, 1280.0));
        assert_eq!(ctx.scale_x(), 2.0);
        assert_eq!(ctx.scale_y(), 2.0);
        let out = ctx.container_to_output(&PixelRect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(out, PixelRect::new(20.0, 40.0, 60.0, 80.0));
    }

    #[test]
    fn test_cover_crop_landscape_frame_into_portrait() {
        let crop = cover_crop(Size::new(1280.0, 720.0), Size::new(360.0, 640.0));
        assert!((crop.h - 720.0).abs() < 1e-9);
        assert!((crop.w - 405.0).abs() < 1e-9);
        assert!((crop.x - 437.5).abs() < 1e-9);
    }

    #[test]
    fn test_size_to_pixels_never_zero() {
        assert_eq!(Size::new(0.2, 0.0).to_pixels(), (1, 1));
        assert_eq!(Size::new(719.6, 1280.4).to_pixels(), (720, 1280));
    }
}
