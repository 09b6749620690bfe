//! Boothcam camera acquisition.
//!
//! A [`FrameSource`] owns one [`CameraBackend`] and walks a
//! [`FallbackLadder`] of [`MediaConstraints`] until a stream opens. Frames
//! are handed out as shared RGBA buffers.

pub mod backend;
pub mod constraints;
pub mod source;
pub mod still;
pub mod synthetic;

pub use backend::{select_device, CameraBackend, CameraStream, DeviceInfo, Frame};
pub use constraints::{CameraMode, MediaConstraints};
pub use source::{FallbackLadder, FrameSource, StreamInfo};
pub use still::StillImageCamera;
pub use synthetic::{test_pattern, SyntheticCamera, SyntheticControl};
