//! Frame source: acquires a camera through the fallback ladder and hands
//! out the current frame.

use boothcam_common::config::{CameraDefaults, Facing};
use boothcam_common::error::CameraError;
use serde::Serialize;

use crate::backend::{CameraBackend, CameraStream, DeviceInfo, Frame};
use crate::constraints::{CameraMode, MediaConstraints};

/// Ordered list of constraint sets tried until one succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackLadder {
    rungs: Vec<MediaConstraints>,
}

impl FallbackLadder {
    /// Rear camera with rich constraints, then front camera with rich
    /// constraints, then front camera with minimal constraints.
    pub fn from_defaults(defaults: &CameraDefaults) -> Self {
        Self {
            rungs: vec![
                MediaConstraints::rich(defaults, Facing::Environment),
                MediaConstraints::rich(defaults, Facing::User),
                MediaConstraints::minimal(
                    defaults.minimal_width,
                    defaults.minimal_height,
                    Facing::User,
                ),
            ],
        }
    }

    pub fn new(rungs: Vec<MediaConstraints>) -> Self {
        Self { rungs }
    }

    pub fn rungs(&self) -> &[MediaConstraints] {
        &self.rungs
    }
}

/// Details of the stream that ended up open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamInfo {
    pub facing: Facing,
    pub mode: CameraMode,
    /// Index of the ladder rung that succeeded.
    pub rung: usize,
}

/// Owns the backend and at most one live stream.
pub struct FrameSource {
    backend: Box<dyn CameraBackend>,
    ladder: FallbackLadder,
    stream: Option<Box<dyn CameraStream>>,
    info: Option<StreamInfo>,
}

impl FrameSource {
    pub fn new(backend: Box<dyn CameraBackend>, ladder: FallbackLadder) -> Self {
        Self {
            backend,
            ladder,
            stream: None,
            info: None,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Ask the backend which devices exist without opening any of them.
    pub async fn probe(&mut self) -> Result<Vec<DeviceInfo>, CameraError> {
        let devices = self.backend.probe().await?;
        tracing::debug!(
            backend = self.backend.name(),
            devices = devices.len(),
            "Camera probe"
        );
        Ok(devices)
    }

    /// Walk the ladder until a rung opens.
    ///
    /// `PermissionDenied` stops the walk immediately. Otherwise the error of
    /// the last rung tried is returned. Any previous stream is released first.
    pub async fn open(&mut self) -> Result<StreamInfo, CameraError> {
        self.close();

        let mut last_err = CameraError::DeviceNotFound;
        for (rung, constraints) in self.ladder.rungs.iter().enumerate() {
            match self.backend.acquire(constraints).await {
                Ok(stream) => {
                    let info = StreamInfo {
                        facing: stream.facing(),
                        mode: stream.mode(),
                        rung,
                    };
                    tracing::info!(
                        backend = self.backend.name(),
                        facing = ?info.facing,
                        mode = %info.mode,
                        rung,
                        "Camera stream acquired"
                    );
                    self.stream = Some(stream);
                    self.info = Some(info);
                    return Ok(info);
                }
                Err(e) if e.is_terminal() => {
                    tracing::warn!(rung, error = %e, "Camera acquisition stopped");
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!(rung, facing = ?constraints.facing, error = %e, "Camera rung failed");
                    last_err = e;
                }
            }
        }

        tracing::warn!(error = %last_err, "All camera fallbacks failed");
        Err(last_err)
    }

    /// The frame currently being delivered. `NotReady` before a stream opens.
    pub fn current_frame(&mut self) -> Result<Frame, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotReady)?;
        stream.read_frame()
    }

    pub fn is_ready(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    pub fn info(&self) -> Option<StreamInfo> {
        self.info
    }

    pub fn native_size(&self) -> Option<(u32, u32)> {
        self.info.map(|i| (i.mode.width, i.mode.height))
    }

    pub fn facing(&self) -> Option<Facing> {
        self.info.map(|i| i.facing)
    }

    /// Release the device. Safe to call when nothing is open.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!(backend = self.backend.name(), "Camera stream released");
        }
        self.info = None;
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.close();
    }
}
