//! Overlay assets, the member catalog, and overlay placement.

use std::path::PathBuf;

use boothcam_common::config::OverlayDefaults;
use serde::{Deserialize, Serialize};

use crate::geometry::{FractionalRect, PixelRect, Size};

/// How an overlay is positioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Anchor {
    /// Bottom-anchored, horizontally centered, sized as a fraction of the frame.
    Fixed(FixedPlacement),
    /// Positioned by the user inside a fractional box.
    Draggable,
}

/// A secondary image that can be composited onto the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayAsset {
    pub id: String,
    /// Display label (member name for portraits).
    pub label: String,
    /// Image path relative to the asset root.
    pub path: PathBuf,
    pub anchor: Anchor,
}

/// Fixed layout relative to the base frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPlacement {
    /// Overlay width as a fraction of the base width.
    pub width_fraction: f64,
    /// Optional cap on the overlay height as a fraction of the base height.
    #[serde(default)]
    pub max_height_fraction: Option<f64>,
    /// Gap from the base bottom edge as a fraction of the base height.
    pub bottom_fraction: f64,
}

impl FixedPlacement {
    /// Resolve to pixels against `target`, preserving the asset's aspect
    /// ratio by scaling uniformly against the tighter constraint.
    pub fn resolve(&self, native: Size, target: Size) -> PixelRect {
        if native.is_empty() {
            return PixelRect::new(target.width / 2.0, target.height, 0.0, 0.0);
        }
        let mut scale = self.width_fraction * target.width / native.width;
        if let Some(max_h) = self.max_height_fraction {
            scale = scale.min(max_h * target.height / native.height);
        }
        let w = native.width * scale;
        let h = native.height * scale;
        let x = (target.width - w) / 2.0;
        let y = target.height - self.bottom_fraction * target.height - h;
        PixelRect::new(x, y, w, h)
    }
}

/// Where an overlay layer lands on the base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerPlacement {
    Fixed(FixedPlacement),
    /// The asset is contained and centered within this fractional box.
    Boxed(FractionalRect),
}

impl LayerPlacement {
    /// Pixel rect the asset image occupies on `target`.
    pub fn resolve(&self, native: Size, target: Size) -> PixelRect {
        match self {
            LayerPlacement::Fixed(fixed) => fixed.resolve(native, target),
            LayerPlacement::Boxed(frac) => frac.to_pixels(target).fit_contain(native),
        }
    }
}

/// One overlay to draw, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub asset_id: String,
    pub placement: LayerPlacement,
}

/// Drag position measured from the container's right and bottom edges (px).
///
/// Measuring from the far edges keeps the overlay stable when the container
/// is resized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragPosition {
    pub x_from_right: f64,
    pub y_from_bottom: f64,
}

impl DragPosition {
    pub const fn new(x_from_right: f64, y_from_bottom: f64) -> Self {
        Self {
            x_from_right,
            y_from_bottom,
        }
    }
}

/// Limits applied to every drag position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragLimits {
    pub min_x: f64,
    /// Keeps the overlay clear of the shutter control.
    pub min_y: f64,
}

impl DragLimits {
    /// Clamp a position into the container; the minimum inset always wins
    /// over the far-edge bound.
    pub fn clamp(&self, pos: DragPosition, container: Size, box_size: Size) -> DragPosition {
        let max_x = (container.width - box_size.width).max(self.min_x);
        let max_y = (container.height - box_size.height).max(self.min_y);
        DragPosition {
            x_from_right: clamp_or_min(pos.x_from_right, self.min_x, max_x),
            y_from_bottom: clamp_or_min(pos.y_from_bottom, self.min_y, max_y),
        }
    }
}

fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.min(max).max(min)
}

/// Container-space box of the draggable overlay.
pub fn drag_box(pos: DragPosition, container: Size, box_fraction: f64) -> PixelRect {
    let w = container.width * box_fraction;
    let h = container.height * box_fraction;
    PixelRect::new(
        container.width - pos.x_from_right - w,
        container.height - pos.y_from_bottom - h,
        w,
        h,
    )
}

/// Selectable portraits plus the fixed art, as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCatalog {
    members: Vec<OverlayAsset>,
    fixed: Vec<OverlayAsset>,
}

impl OverlayCatalog {
    pub fn from_defaults(defaults: &OverlayDefaults) -> Self {
        let members = defaults
            .members
            .iter()
            .map(|m| OverlayAsset {
                id: m.id.clone(),
                label: m.name.clone(),
                path: m.image.clone(),
                anchor: Anchor::Draggable,
            })
            .collect();
        let fixed = defaults
            .fixed
            .iter()
            .map(|f| OverlayAsset {
                id: f.id.clone(),
                label: f.id.clone(),
                path: f.image.clone(),
                anchor: Anchor::Fixed(FixedPlacement {
                    width_fraction: f.width_fraction,
                    max_height_fraction: None,
                    bottom_fraction: f.bottom_fraction,
                }),
            })
            .collect();
        Self { members, fixed }
    }

    pub fn members(&self) -> &[OverlayAsset] {
        &self.members
    }

    pub fn fixed(&self) -> &[OverlayAsset] {
        &self.fixed
    }

    pub fn member(&self, id: &str) -> Option<&OverlayAsset> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Every asset, fixed art first.
    pub fn all(&self) -> impl Iterator<Item = &OverlayAsset> {
        self.fixed.iter().chain(self.members.iter())
    }

    pub fn get(&self, id: &str) -> Option<&OverlayAsset> {
        self.all().find(|a| a.id == id)
    }
}

impl Default for OverlayCatalog {
    fn default() -> Self {
        Self::from_defaults(&OverlayDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_placement_bottom_centered() {
        let placement = FixedPlacement {
            width_fraction: 0.6,
            max_height_fraction: None,
            bottom_fraction: 0.05,
        };
        let rect = placement.resolve(Size::new(200.0, 100.0), Size::new(1000.0, 2000.0));
        assert!((rect.w - 600.0).abs() < 1e-9);
        assert!((rect.h - 300.0).abs() < 1e-9);
        assert!((rect.x - 200.0).abs() < 1e-9);
        assert!((rect.bottom() - 1900.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_placement_height_cap_is_tighter() {
        let placement = FixedPlacement {
            width_fraction: 1.0,
            max_height_fraction: Some(0.1),
            bottom_fraction: 0.0,
        };
        let rect = placement.resolve(Size::new(100.0, 100.0), Size::new(1000.0, 1000.0));
        assert!((rect.w - 100.0).abs() < 1e-9);
        assert!((rect.h - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_box_from_edges() {
        let rect = drag_box(
            DragPosition::new(16.0, 150.0),
            Size::new(360.0, 640.0),
            0.2,
        );
        assert!((rect.w - 72.0).abs() < 1e-9);
        assert!((rect.right() - 344.0).abs() < 1e-9);
        assert!((rect.bottom() - 490.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_enforces_min_inset() {
        let limits = DragLimits {
            min_x: 0.0,
            min_y: 150.0,
        };
        let container = Size::new(360.0, 640.0);
        let box_size = Size::new(72.0, 128.0);
        let pos = limits.clamp(DragPosition::new(-20.0, 10.0), container, box_size);
        assert_eq!(pos, DragPosition::new(0.0, 150.0));

        let pos = limits.clamp(DragPosition::new(1000.0, 1000.0), container, box_size);
        assert_eq!(pos, DragPosition::new(288.0, 512.0));
    }

    #[test]
    fn test_clamp_min_wins_in_tiny_container() {
        let limits = DragLimits {
            min_x: 0.0,
            min_y: 150.0,
        };
        let pos = limits.clamp(
            DragPosition::new(5.0, 400.0),
            Size::new(100.0, 100.0),
            Size::new(20.0, 20.0),
        );
        assert_eq!(pos.y_from_bottom, 150.0);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = OverlayCatalog::default();
        assert_eq!(catalog.members().len(), 7);
        assert_eq!(catalog.member("maya").unwrap().label, "MAYA");
        assert!(matches!(
            catalog.get("live_logo").unwrap().anchor,
            Anchor::Fixed(_)
        ));
        assert!(catalog.member("live_logo").is_none());
    }
}
