//! Camera backend contracts.

use std::sync::Arc;

use boothcam_common::config::Facing;
use boothcam_common::error::CameraError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::constraints::{CameraMode, MediaConstraints};

/// A camera device as reported by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub label: String,
    pub facing: Facing,
    pub modes: Vec<CameraMode>,
}

/// One decoded camera frame.
///
/// Pixels are shared so the preview loop and the capture pipeline can hold
/// the same frame without copying it.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbaImage>,
    sequence: u64,
    timestamp_ns: u64,
}

impl Frame {
    pub fn new(image: RgbaImage, sequence: u64, timestamp_ns: u64) -> Self {
        Self {
            image: Arc::new(image),
            sequence,
            timestamp_ns,
        }
    }

    pub fn from_shared(image: Arc<RgbaImage>, sequence: u64, timestamp_ns: u64) -> Self {
        Self {
            image,
            sequence,
            timestamp_ns,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn shared_image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }
}

/// An open camera stream.
pub trait CameraStream: Send {
    /// Mode negotiated when the stream was opened.
    fn mode(&self) -> CameraMode;

    fn facing(&self) -> Facing;

    /// Most recent frame. Fails once the stream has been stopped or lost.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;

    fn is_live(&self) -> bool;

    /// Release the device. Calling this twice is harmless.
    fn stop(&mut self);
}

/// Abstract interface for a source of camera devices.
#[async_trait::async_trait]
pub trait CameraBackend: Send {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Check that the backend is usable (permission, device enumeration).
    async fn probe(&mut self) -> Result<Vec<DeviceInfo>, CameraError>;

    /// Open a stream satisfying `constraints`.
    async fn acquire(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// Pick the device matching the requested facing and negotiate its mode.
pub fn select_device<'a>(
    devices: &'a [DeviceInfo],
    constraints: &MediaConstraints,
) -> Result<(&'a DeviceInfo, CameraMode), CameraError> {
    let mut last_err = CameraError::DeviceNotFound;
    for device in devices.iter().filter(|d| d.facing == constraints.facing) {
        match constraints.negotiate(&device.modes) {
            Ok(mode) => return Ok((device, mode)),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}
