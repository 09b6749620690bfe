//! Boothcam Session
//!
//! Wires the camera, booth state, overlay assets, capture pipeline, and
//! export sink into one running photo booth. The host feeds UI events in and
//! pulls preview frames and captured stills out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   BoothSession                    │
//! │  ┌─────────────┐  ┌────────────┐  ┌────────────┐ │
//! │  │ FrameSource │  │ BoothState │  │ AssetStore │ │
//! │  │  (ladder)   │  │  (events)  │  │ (overlays) │ │
//! │  └──────┬──────┘  └─────┬──────┘  └─────┬──────┘ │
//! │         │               │               │        │
//! │         ▼               ▼               ▼        │
//! │  ┌─────────────────────────────────────────────┐ │
//! │  │  rasterize: filter ─▶ composite ─▶ encode   │ │
//! │  └──────────┬───────────────────────┬──────────┘ │
//! │             ▼                       ▼            │
//! │        live preview          CaptureMachine      │
//! │                                     │            │
//! │                                     ▼            │
//! │                              ExportSink          │
//! │                        download · share          │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod session;

pub use session::*;
