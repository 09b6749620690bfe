//! Boothcam Filter Engine
//!
//! Turns a raw camera frame into the filtered frame shown in the preview and
//! baked into captures:
//! - **Tone:** brightness, then contrast, as an 8-bit lookup table
//! - **Named filters:** grayscale and sepia color matrices, Gaussian blur
//! - **Redraw:** the paced loop that drives the live preview
//!
//! Filtering is pure computation. The same frame and settings always give
//! the same pixels.

pub mod color;
pub mod pipeline;
pub mod redraw;
pub mod tone;

pub use pipeline::{apply_filters, FilterPipeline, BLUR_SIGMA};
pub use redraw::{RedrawHandle, RedrawTask, RedrawStats};
pub use tone::ToneCurve;
