//! Overlay compositor: draws placed overlay layers over a filtered frame.
//!
//! Each layer is scaled to its resolved rectangle and alpha-blended onto the
//! base. A soft black drop shadow is drawn under every layer first.

use std::sync::Arc;

use boothcam_scene_model::geometry::{PixelRect, Size};
use boothcam_scene_model::overlay::LayerPlacement;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// An overlay layer whose image is loaded and ready to draw.
#[derive(Debug, Clone)]
pub struct ResolvedLayer {
    pub asset_id: String,
    pub image: Arc<RgbaImage>,
    pub placement: LayerPlacement,
}

impl ResolvedLayer {
    pub fn native_size(&self) -> Size {
        Size::from_u32(self.image.width(), self.image.height())
    }

    /// Rectangle the image occupies on a base of `target` size.
    pub fn rect_on(&self, target: Size) -> PixelRect {
        self.placement.resolve(self.native_size(), target)
    }
}

/// Drop shadow drawn under each overlay, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    /// Blur radius; the Gaussian standard deviation is half of it.
    pub blur_radius: f32,
    pub opacity: f32,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            blur_radius: 8.0,
            opacity: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Compositor {
    shadow: Option<ShadowStyle>,
    /// Layout-to-target pixel ratio applied to the shadow radius.
    pixel_scale: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Compositor {
    pub fn new(pixel_scale: f32) -> Self {
        Self {
            shadow: Some(ShadowStyle::default()),
            pixel_scale: if pixel_scale.is_finite() && pixel_scale > 0.0 {
                pixel_scale
            } else {
                1.0
            },
        }
    }

    pub fn without_shadow(mut self) -> Self {
        self.shadow = None;
        self
    }

    /// Draw `layers` over `base` in order.
    pub fn compose(&self, base: &mut RgbaImage, layers: &[ResolvedLayer]) {
        let target = Size::from_u32(base.width(), base.height());
        for layer in layers {
            let rect = layer.rect_on(target);
            self.draw_layer(base, &layer.image, rect);
        }
    }

    fn draw_layer(&self, base: &mut RgbaImage, image: &RgbaImage, rect: PixelRect) {
        let w = rect.w.round();
        let h = rect.h.round();
        if w < 1.0 || h < 1.0 {
            return;
        }
        let sprite = if image.dimensions() == (w as u32, h as u32) {
            image.clone()
        } else {
            imageops::resize(image, w as u32, h as u32, FilterType::Triangle)
        };
        let x = rect.x.round() as i64;
        let y = rect.y.round() as i64;

        if let Some(style) = &self.shadow {
            let sigma = style.blur_radius / 2.0 * self.pixel_scale;
            let (shadow, pad) = drop_shadow(&sprite, sigma, style.opacity);
            imageops::overlay(base, &shadow, x - pad, y - pad);
        }
        imageops::overlay(base, &sprite, x, y);
    }
}

/// Blurred, tinted alpha mask of `sprite`, padded so the blur is not clipped.
fn drop_shadow(sprite: &RgbaImage, sigma: f32, opacity: f32) -> (RgbaImage, i64) {
    let pad = (sigma * 3.0).ceil().max(0.0) as u32;
    let mut mask = RgbaImage::new(sprite.width() + 2 * pad, sprite.height() + 2 * pad);
    for (x, y, px) in sprite.enumerate_pixels() {
        mask.put_pixel(x + pad, y + pad, Rgba([0, 0, 0, px[3]]));
    }
    let mut shadow = if sigma > 0.0 {
        imageops::blur(&mask, sigma)
    } else {
        mask
    };
    let opacity = opacity.clamp(0.0, 1.0);
    for px in shadow.pixels_mut() {
        *px = Rgba([0, 0, 0, (px[3] as f32 * opacity).round() as u8]);
    }
    (shadow, pad as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boothcam_scene_model::geometry::FractionalRect;
    use boothcam_scene_model::overlay::FixedPlacement;

    fn layer(image: RgbaImage, placement: LayerPlacement) -> ResolvedLayer {
        ResolvedLayer {
            asset_id: "test".to_string(),
            image: Arc::new(image),
            placement,
        }
    }

    #[test]
    fn test_opaque_layer_covers_its_rect() {
        let mut base = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let red = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let boxed = layer(
            red,
            LayerPlacement::Boxed(FractionalRect::new(0.5, 0.5, 0.2, 0.2)),
        );
        Compositor::default().without_shadow().compose(&mut base, &[boxed]);
        assert_eq!(base.get_pixel(60, 60), &Rgba([255, 0, 0, 255]));
        assert_eq!(base.get_pixel(40, 40), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_shadow_darkens_around_layer() {
        let mut base = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let red = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 255]));
        let boxed = layer(
            red,
            LayerPlacement::Boxed(FractionalRect::new(0.4, 0.4, 0.2, 0.2)),
        );
        Compositor::default().compose(&mut base, &[boxed]);
        // Just outside the right edge of the layer.
        let px = base.get_pixel(61, 50);
        assert!(px[0] < 255 && px[0] == px[1], "{px:?}");
        // Far corner untouched.
        assert_eq!(base.get_pixel(2, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_transparent_pixels_keep_base() {
        let mut base = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 255, 255]));
        let clear = RgbaImage::new(10, 10);
        let fixed = layer(
            clear,
            LayerPlacement::Fixed(FixedPlacement {
                width_fraction: 0.5,
                max_height_fraction: None,
                bottom_fraction: 0.0,
            }),
        );
        Compositor::default().compose(&mut base, &[fixed]);
        assert!(base.pixels().all(|p| *p == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_later_layers_draw_on_top() {
        let mut base = RgbaImage::new(40, 40);
        let full = LayerPlacement::Boxed(FractionalRect::FULL);
        let layers = [
            layer(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])), full),
            layer(RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255])), full),
        ];
        Compositor::default().without_shadow().compose(&mut base, &layers);
        assert_eq!(base.get_pixel(20, 20), &Rgba([0, 255, 0, 255]));
    }
}
