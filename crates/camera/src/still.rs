//! Camera backend that replays a still image.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use boothcam_common::config::Facing;
use boothcam_common::error::CameraError;
use image::RgbaImage;

use crate::backend::{select_device, CameraBackend, CameraStream, DeviceInfo, Frame};
use crate::constraints::{CameraMode, MediaConstraints};

/// Presents one image file as both a rear and a front camera whose only
/// mode is the image's native size.
pub struct StillImageCamera {
    path: PathBuf,
    image: Option<Arc<RgbaImage>>,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            image: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&mut self) -> Result<Arc<RgbaImage>, CameraError> {
        if let Some(image) = &self.image {
            return Ok(Arc::clone(image));
        }
        if !self.path.exists() {
            return Err(CameraError::DeviceNotFound);
        }
        let path = self.path.clone();
        let decoded = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| CameraError::unknown(format!("decode task failed: {e}")))?
            .map_err(|e| CameraError::unknown(format!("{}: {e}", self.path.display())))?;
        let image = Arc::new(decoded.to_rgba8());
        self.image = Some(Arc::clone(&image));
        Ok(image)
    }

    fn devices_for(&self, image: &RgbaImage) -> Vec<DeviceInfo> {
        let mode = CameraMode::new(image.width(), image.height());
        [Facing::Environment, Facing::User]
            .into_iter()
            .map(|facing| DeviceInfo {
                id: format!("still:{}", self.path.display()),
                label: self
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "still image".to_string()),
                facing,
                modes: vec![mode],
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl CameraBackend for StillImageCamera {
    fn name(&self) -> &str {
        "still-image"
    }

    async fn probe(&mut self) -> Result<Vec<DeviceInfo>, CameraError> {
        let image = self.load().await?;
        Ok(self.devices_for(&image))
    }

    async fn acquire(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        let image = self.load().await?;
        let devices = self.devices_for(&image);
        let (device, mode) = select_device(&devices, constraints)?;
        tracing::debug!(path = %self.path.display(), %mode, "Still image stream opened");
        Ok(Box::new(StillStream {
            image,
            mode,
            facing: device.facing,
            sequence: 0,
            started: Instant::now(),
            live: true,
        }))
    }
}

struct StillStream {
    image: Arc<RgbaImage>,
    mode: CameraMode,
    facing: Facing,
    sequence: u64,
    started: Instant,
    live: bool,
}

impl CameraStream for StillStream {
    fn mode(&self) -> CameraMode {
        self.mode
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        if !self.live {
            return Err(CameraError::NotReady);
        }
        self.sequence += 1;
        Ok(Frame::from_shared(
            Arc::clone(&self.image),
            self.sequence,
            self.started.elapsed().as_nanos() as u64,
        ))
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn stop(&mut self) {
        self.live = false;
    }
}
