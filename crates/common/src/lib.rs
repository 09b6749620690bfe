//! Boothcam Common Utilities
//!
//! Shared infrastructure for all Boothcam crates:
//! - Error taxonomy (camera, capture, share) and result aliases
//! - Refresh clock and rate pacing for the live preview
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
