//! Mutable booth UI state and its transition function.
//!
//! The UI is the single writer; the filter engine, compositor, and capture
//! pipeline read a [`SceneSnapshot`] taken from this state.

use boothcam_common::config::OverlayDefaults;

use crate::event::{PointerSource, UiEvent};
use crate::filter::FilterSettings;
use crate::geometry::{FractionalRect, PixelRect, Size};
use crate::overlay::{
    drag_box, Anchor, DragLimits, DragPosition, LayerPlacement, OverlayCatalog, OverlayLayer,
};

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Nothing changed.
    Unchanged,
    /// Filter settings changed.
    Filter,
    /// Member selection changed (new selection, if any).
    Selection(Option<String>),
    /// The draggable overlay moved to this clamped position.
    Moved(DragPosition),
    /// Drag began or ended.
    Grab(bool),
    /// Container resized.
    Layout,
    /// Fixed art visibility toggled.
    FixedArt(bool),
    /// Unknown member id, ignored.
    Rejected(String),
    /// A session command (shutter/retake) to be handled by the owner.
    Command(UiEvent),
}

/// Everything the pipeline needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    pub filter: FilterSettings,
    /// Overlays in draw order; later layers on top.
    pub layers: Vec<OverlayLayer>,
    /// On-screen container size (CSS px).
    pub container: Size,
}

impl SceneSnapshot {
    pub fn asset_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.asset_id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Grab {
    /// Offset from the pointer (edge-relative) to the drag position.
    offset_x: f64,
    offset_y: f64,
    source: PointerSource,
}

/// Selected member, slider values, and drag position.
#[derive(Debug, Clone)]
pub struct BoothState {
    catalog: OverlayCatalog,
    filter: FilterSettings,
    selected_member: Option<String>,
    position: DragPosition,
    limits: DragLimits,
    box_fraction: f64,
    container: Size,
    show_fixed_art: bool,
    grab: Option<Grab>,
}

impl BoothState {
    pub fn new(defaults: &OverlayDefaults, container: Size) -> Self {
        let limits = DragLimits {
            min_x: defaults.min_inset_x,
            min_y: defaults.min_inset_y,
        };
        let mut state = Self {
            catalog: OverlayCatalog::from_defaults(defaults),
            filter: FilterSettings::default(),
            selected_member: None,
            position: DragPosition::new(defaults.initial_x, defaults.initial_y),
            limits,
            box_fraction: defaults.member_box_fraction,
            container,
            show_fixed_art: !defaults.fixed.is_empty(),
            grab: None,
        };
        state.position = state.clamped(state.position);
        state
    }

    pub fn catalog(&self) -> &OverlayCatalog {
        &self.catalog
    }

    pub fn filter(&self) -> FilterSettings {
        self.filter
    }

    pub fn selected_member(&self) -> Option<&str> {
        self.selected_member.as_deref()
    }

    pub fn member_position(&self) -> DragPosition {
        self.position
    }

    pub fn limits(&self) -> DragLimits {
        self.limits
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn shows_fixed_art(&self) -> bool {
        self.show_fixed_art
    }

    /// Container-space box of the member overlay.
    pub fn member_box(&self) -> PixelRect {
        drag_box(self.position, self.container, self.box_fraction)
    }

    /// Place the member overlay directly (clamped).
    pub fn set_member_position(&mut self, pos: DragPosition) -> DragPosition {
        self.position = self.clamped(pos);
        self.position
    }

    /// Apply one UI event.
    pub fn apply(&mut self, event: &UiEvent) -> StateChange {
        match event {
            UiEvent::SelectMember { id } => {
                if self.catalog.member(id).is_none() {
                    tracing::warn!(member = %id, "Ignoring unknown member");
                    return StateChange::Rejected(id.clone());
                }
                if self.selected_member.as_deref() == Some(id.as_str()) {
                    self.selected_member = None;
                } else {
                    self.selected_member = Some(id.clone());
                }
                self.grab = None;
                StateChange::Selection(self.selected_member.clone())
            }
            UiEvent::ClearMember => {
                self.grab = None;
                if self.selected_member.take().is_some() {
                    StateChange::Selection(None)
                } else {
                    StateChange::Unchanged
                }
            }
            UiEvent::SetFilter { kind } => self.update_filter(|f| f.kind = *kind),
            UiEvent::SetBrightness { pct } => self.update_filter(|f| f.set_brightness(*pct)),
            UiEvent::SetContrast { pct } => self.update_filter(|f| f.set_contrast(*pct)),
            UiEvent::SetFixedArt { visible } => {
                if self.show_fixed_art == *visible {
                    return StateChange::Unchanged;
                }
                self.show_fixed_art = *visible;
                StateChange::FixedArt(*visible)
            }
            UiEvent::PointerDown { x, y, source } => self.begin_drag(*x, *y, *source),
            UiEvent::PointerMove { x, y } => self.drag_to(*x, *y),
            UiEvent::PointerUp | UiEvent::PointerLeave => {
                if self.grab.take().is_some() {
                    StateChange::Grab(false)
                } else {
                    StateChange::Unchanged
                }
            }
            UiEvent::Resize { width, height } => {
                if !(width.is_finite() && *width > 0.0 && height.is_finite() && *height > 0.0) {
                    return StateChange::Unchanged;
                }
                self.container = Size::new(*width, *height);
                self.position = self.clamped(self.position);
                StateChange::Layout
            }
            UiEvent::Shutter | UiEvent::Retake => StateChange::Command(event.clone()),
        }
    }

    /// Snapshot of what should be drawn: fixed art, then the member on top.
    pub fn scene(&self) -> SceneSnapshot {
        let mut layers = Vec::new();
        if self.show_fixed_art {
            for asset in self.catalog.fixed() {
                if let Anchor::Fixed(fixed) = asset.anchor {
                    layers.push(OverlayLayer {
                        asset_id: asset.id.clone(),
                        placement: LayerPlacement::Fixed(fixed),
                    });
                }
            }
        }
        if let Some(member) = &self.selected_member {
            layers.push(OverlayLayer {
                asset_id: member.clone(),
                placement: LayerPlacement::Boxed(self.member_fraction()),
            });
        }
        SceneSnapshot {
            filter: self.filter,
            layers,
            container: self.container,
        }
    }

    /// Member box as fractions of the container.
    pub fn member_fraction(&self) -> FractionalRect {
        self.member_box().to_fractional(self.container)
    }

    fn update_filter(&mut self, f: impl FnOnce(&mut FilterSettings)) -> StateChange {
        let before = self.filter;
        f(&mut self.filter);
        if before == self.filter {
            StateChange::Unchanged
        } else {
            StateChange::Filter
        }
    }

    fn begin_drag(&mut self, x: f64, y: f64, source: PointerSource) -> StateChange {
        if self.selected_member.is_none() || !self.member_box().contains(x, y) {
            return StateChange::Unchanged;
        }
        let (from_right, from_bottom) = self.edge_relative(x, y);
        self.grab = Some(Grab {
            offset_x: self.position.x_from_right - from_right,
            offset_y: self.position.y_from_bottom - from_bottom,
            source,
        });
        tracing::debug!(?source, x, y, "Drag started");
        StateChange::Grab(true)
    }

    fn drag_to(&mut self, x: f64, y: f64) -> StateChange {
        let Some(grab) = self.grab else {
            return StateChange::Unchanged;
        };
        let (from_right, from_bottom) = self.edge_relative(x, y);
        let target = DragPosition::new(from_right + grab.offset_x, from_bottom + grab.offset_y);
        self.position = self.clamped(target);
        tracing::trace!(source = ?grab.source, pos = ?self.position, "Drag moved");
        StateChange::Moved(self.position)
    }

    fn edge_relative(&self, x: f64, y: f64) -> (f64, f64) {
        (self.container.width - x, self.container.height - y)
    }

    fn clamped(&self, pos: DragPosition) -> DragPosition {
        let box_size = Size::new(
            self.container.width * self.box_fraction,
            self.container.height * self.box_fraction,
        );
        self.limits.clamp(pos, self.container, box_size)
    }
}
