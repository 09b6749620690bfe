//! Boothcam Render Engine
//!
//! Turns the live scene into a finished photo and delivers it.
//!
//! # Pipeline Architecture
//!
//! ```text
//! camera frame ──┐
//!                ├── Cover-crop / scale (capture strategy)
//! scene ─────────┘         │
//!                          ├── Filters (brightness, contrast, named filter)
//!                          │
//! overlay assets ──────────┴── Drop shadow + alpha blend, in layer order
//!                                        │
//!                                        ▼
//!                                 Encode (JPEG/PNG)
//!                                        │
//!                          ┌─────────────┴─────────────┐
//!                          ▼                           ▼
//!                 <prefix>-<stamp>.<ext>         share target
//! ```

pub mod assets;
pub mod capture;
pub mod compositor;
pub mod encode;
pub mod export;

pub use assets::{placeholder_art, AssetState, AssetStore, PreloadReport};
pub use capture::{
    rasterize, CaptureMachine, CapturePhase, CapturePipeline, CapturedImage, RenderTarget,
    ShutterOutcome,
};
pub use compositor::{Compositor, ResolvedLayer, ShadowStyle};
pub use encode::{encode, JPEG_QUALITY};
pub use export::{ExportSink, NoShare, ShareOutcome, ShareTarget, SharedFile, SystemShare};
