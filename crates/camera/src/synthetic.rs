//! Synthetic camera producing a test pattern.
//!
//! Used by the CLI when no real device is wanted and by tests that need to
//! inject acquisition failures. A [`SyntheticControl`] handle stays with the
//! caller after the camera is moved into a session.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use boothcam_common::config::Facing;
use boothcam_common::error::CameraError;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::backend::{select_device, CameraBackend, CameraStream, DeviceInfo, Frame};
use crate::constraints::{CameraMode, MediaConstraints};

#[derive(Debug, Default)]
struct ControlState {
    permission_denied: bool,
    busy: HashSet<Facing>,
    fail_reads: bool,
    attempts: Vec<MediaConstraints>,
    open_streams: usize,
}

/// Shared knobs for failure injection and inspection.
#[derive(Debug, Clone, Default)]
pub struct SyntheticControl {
    inner: Arc<Mutex<ControlState>>,
}

impl SyntheticControl {
    fn state(&self) -> MutexGuard<'_, ControlState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every acquisition fail with `PermissionDenied`.
    pub fn deny_permission(&self, denied: bool) {
        self.state().permission_denied = denied;
    }

    /// Make devices with this facing report `DeviceBusy`.
    pub fn set_busy(&self, facing: Facing, busy: bool) {
        let mut state = self.state();
        if busy {
            state.busy.insert(facing);
        } else {
            state.busy.remove(&facing);
        }
    }

    /// Make open streams fail on the next read, as if unplugged.
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Constraints of every acquisition attempt, in order.
    pub fn attempts(&self) -> Vec<MediaConstraints> {
        self.state().attempts.clone()
    }

    /// Streams opened and not yet stopped.
    pub fn open_streams(&self) -> usize {
        self.state().open_streams
    }
}

/// Camera backend backed by generated frames.
pub struct SyntheticCamera {
    devices: Vec<DeviceInfo>,
    control: SyntheticControl,
}

impl SyntheticCamera {
    /// A rear camera and a front camera with common phone modes.
    pub fn new() -> Self {
        Self::with_devices(vec![
            DeviceInfo {
                id: "synthetic-back".to_string(),
                label: "Synthetic rear camera".to_string(),
                facing: Facing::Environment,
                modes: vec![
                    CameraMode::new(1280, 720),
                    CameraMode::new(720, 1280),
                    CameraMode::new(640, 480),
                ],
            },
            DeviceInfo {
                id: "synthetic-front".to_string(),
                label: "Synthetic front camera".to_string(),
                facing: Facing::User,
                modes: vec![CameraMode::new(1280, 720), CameraMode::new(640, 480)],
            },
        ])
    }

    pub fn with_devices(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            control: SyntheticControl::default(),
        }
    }

    pub fn control(&self) -> SyntheticControl {
        self.control.clone()
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CameraBackend for SyntheticCamera {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn probe(&mut self) -> Result<Vec<DeviceInfo>, CameraError> {
        if self.control.state().permission_denied {
            return Err(CameraError::PermissionDenied);
        }
        if self.devices.is_empty() {
            return Err(CameraError::DeviceNotFound);
        }
        Ok(self.devices.clone())
    }

    async fn acquire(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        {
            let mut state = self.control.state();
            state.attempts.push(*constraints);
            if state.permission_denied {
                return Err(CameraError::PermissionDenied);
            }
        }

        let (device, mode) = select_device(&self.devices, constraints)?;
        let mut state = self.control.state();
        if state.busy.contains(&device.facing) {
            return Err(CameraError::DeviceBusy);
        }
        state.open_streams += 1;
        drop(state);

        tracing::debug!(device = %device.id, %mode, "Synthetic stream opened");
        Ok(Box::new(SyntheticStream {
            mode,
            facing: device.facing,
            pattern: Arc::new(test_pattern(mode.width, mode.height)),
            sequence: 0,
            started: Instant::now(),
            live: true,
            control: self.control.clone(),
        }))
    }
}

struct SyntheticStream {
    mode: CameraMode,
    facing: Facing,
    pattern: Arc<RgbaImage>,
    sequence: u64,
    started: Instant,
    live: bool,
    control: SyntheticControl,
}

impl CameraStream for SyntheticStream {
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
        if self.control.state().fail_reads {
            return Err(CameraError::unknown("synthetic device disconnected"));
        }
        self.sequence += 1;
        let ts = self.started.elapsed().as_nanos() as u64;
        Ok(Frame::from_shared(
            Arc::clone(&self.pattern),
            self.sequence,
            ts,
        ))
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            let mut state = self.control.state();
            state.open_streams = state.open_streams.saturating_sub(1);
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Gradient background with corner markers (red) and a center marker (green).
pub fn test_pattern(width: u32, height: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let mut img: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let b = (y * 255 / height) as u8;
        Rgba([r / 2 + 40, 60, b / 2 + 50, 255])
    });

    let (w, h) = (width as i32, height as i32);
    let radius = (w.min(h) / 20).max(1);
    let inset = radius + radius / 2;
    let corners = [
        (inset, inset),
        (w - inset, inset),
        (w - inset, h - inset),
        (inset, h - inset),
    ];
    for center in corners {
        draw_filled_circle_mut(&mut img, center, radius, Rgba([255, 50, 50, 255]));
    }

    draw_filled_circle_mut(
        &mut img,
        (w / 2, h / 2),
        radius * 3 / 2,
        Rgba([50, 255, 50, 255]),
    );

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use boothcam_common::config::CameraDefaults;

    #[test]
    fn test_pattern_markers() {
        let img = test_pattern(200, 400);
        assert_eq!(img.dimensions(), (200, 400));
        assert_eq!(img.get_pixel(100, 200), &Rgba([50, 255, 50, 255]));
        assert_eq!(img.get_pixel(15, 15), &Rgba([255, 50, 50, 255]));
    }

    #[test]
    fn test_tiny_pattern_does_not_panic() {
        let img = test_pattern(1, 1);
        assert_eq!(img.dimensions(), (1, 1));
    }

    #[tokio::test]
    async fn test_acquire_and_read() {
        let mut camera = SyntheticCamera::new();
        let control = camera.control();
        let constraints = MediaConstraints::rich(&CameraDefaults::default(), Facing::Environment);
        let mut stream = camera.acquire(&constraints).await.unwrap();
        assert_eq!(stream.mode(), CameraMode::new(720, 1280));
        assert_eq!(control.open_streams(), 1);

        let first = stream.read_frame().unwrap();
        let second = stream.read_frame().unwrap();
        assert!(second.sequence() > first.sequence());
        assert_eq!((first.width(), first.height()), (720, 1280));

        stream.stop();
        stream.stop();
        assert_eq!(control.open_streams(), 0);
        assert_eq!(stream.read_frame().unwrap_err(), CameraError::NotReady);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let mut camera = SyntheticCamera::new();
        let control = camera.control();
        let constraints = MediaConstraints::rich(&CameraDefaults::default(), Facing::User);

        control.set_busy(Facing::User, true);
        assert!(matches!(
            camera.acquire(&constraints).await,
            Err(CameraError::DeviceBusy)
        ));

        control.set_busy(Facing::User, false);
        control.deny_permission(true);
        assert!(matches!(
            camera.acquire(&constraints).await,
            Err(CameraError::PermissionDenied)
        ));
        assert_eq!(camera.probe().await.unwrap_err(), CameraError::PermissionDenied);
        assert_eq!(control.attempts().len(), 2);
        assert_eq!(control.open_streams(), 0);
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_device() {
        let mut camera = SyntheticCamera::new();
        let control = camera.control();
        let constraints = MediaConstraints::minimal(640, 480, Facing::User);
        let stream = camera.acquire(&constraints).await.unwrap();
        assert_eq!(control.open_streams(), 1);
        drop(stream);
        assert_eq!(control.open_streams(), 0);
    }
}
