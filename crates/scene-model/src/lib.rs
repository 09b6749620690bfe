//! Boothcam Scene Model
//!
//! Defines the data contracts shared by the preview and capture paths:
//! - **Geometry:** Sizes, pixel and fractional rects, the composition context
//! - **Filters:** Brightness/contrast/named-filter settings
//! - **Overlays:** Assets, the member catalog, fixed and draggable placement
//! - **Events:** UI events and JSONL scripts
//! - **State:** The booth UI state and its transition function
//!
//! Overlay placement is kept as fractions of the base frame so the same
//! layout reproduces at any output resolution.

pub mod event;
pub mod filter;
pub mod geometry;
pub mod overlay;
pub mod state;

pub use event::*;
pub use filter::*;
pub use geometry::*;
pub use overlay::*;
pub use state::*;
