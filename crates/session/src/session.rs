//! Booth session management.

use std::ops::ControlFlow;
use std::path::PathBuf;

use boothcam_camera::{CameraBackend, FallbackLadder, FrameSource, StreamInfo};
use boothcam_common::config::AppConfig;
use boothcam_common::error::{BoothError, BoothResult, CameraError, CaptureError};
use boothcam_filter_engine::{RedrawHandle, RedrawStats, RedrawTask};
use boothcam_render_engine::{
    rasterize, AssetStore, CaptureMachine, CapturePhase, CapturePipeline, CapturedImage,
    ExportSink, PreloadReport, RenderTarget, ShareOutcome, ShareTarget, ShutterOutcome,
};
use boothcam_scene_model::event::UiEvent;
use boothcam_scene_model::geometry::Size;
use boothcam_scene_model::overlay::DragPosition;
use boothcam_scene_model::state::{BoothState, StateChange};
use image::RgbaImage;
use serde::Serialize;

/// Camera loading state shown while the preview mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    Starting,
    Live,
    Failed,
}

/// The one error the UI shows at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSurface {
    /// Blocking; the user can only retry.
    Camera(CameraError),
    /// Transient notice over the live preview.
    CaptureNotice(CaptureError),
}

impl ErrorSurface {
    pub fn message(&self) -> String {
        match self {
            ErrorSurface::Camera(e) => e.user_message(),
            ErrorSurface::CaptureNotice(e) => e.user_message(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, ErrorSurface::Camera(_))
    }
}

/// What a dispatched event ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    State(StateChange),
    /// Shutter pressed; `true` when a still was captured.
    Shutter { captured: bool },
    Retake { cleared: bool },
}

/// A running photo booth: camera, UI state, overlays, capture and export.
pub struct BoothSession {
    config: AppConfig,
    source: FrameSource,
    state: BoothState,
    assets: AssetStore,
    pipeline: CapturePipeline,
    machine: CaptureMachine,
    export: ExportSink,
    status: CameraStatus,
    camera_error: Option<CameraError>,
    capture_notice: Option<CaptureError>,
    redraw: RedrawHandle,
}

impl BoothSession {
    pub fn new(
        config: AppConfig,
        backend: Box<dyn CameraBackend>,
        share_target: Box<dyn ShareTarget>,
    ) -> Self {
        let container = Size::from_u32(
            config.capture.container_width,
            config.capture.container_height,
        );
        let state = BoothState::new(&config.overlays, container);
        let mut assets = AssetStore::new(&config.asset_root);
        assets.register_catalog(state.catalog());

        Self {
            source: FrameSource::new(backend, FallbackLadder::from_defaults(&config.camera)),
            pipeline: CapturePipeline::from_defaults(&config.capture),
            export: ExportSink::new(
                &config.output_dir,
                &config.capture.file_prefix,
                share_target,
            ),
            state,
            assets,
            machine: CaptureMachine::new(),
            status: CameraStatus::Starting,
            camera_error: None,
            capture_notice: None,
            redraw: RedrawHandle::new(),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Probe and open the camera, then preload overlay art.
    pub async fn start(&mut self) -> Result<StreamInfo, CameraError> {
        tracing::info!(backend = self.source.backend_name(), "Starting booth session");
        let opened = self.open_camera().await;
        let report = self.preload_assets().await;
        if !report.failed.is_empty() {
            tracing::warn!(failed = report.failed.len(), "Some overlay art is unavailable");
        }
        opened
    }

    /// Rerun camera acquisition from the top of the fallback ladder.
    pub async fn retry_camera(&mut self) -> Result<StreamInfo, CameraError> {
        tracing::info!("Retrying camera");
        self.open_camera().await
    }

    async fn open_camera(&mut self) -> Result<StreamInfo, CameraError> {
        self.status = CameraStatus::Starting;
        self.camera_error = None;
        let result = match self.source.probe().await {
            Ok(_) => self.source.open().await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(_) => self.status = CameraStatus::Live,
            Err(e) => {
                tracing::warn!(error = %e, "Camera unavailable");
                self.status = CameraStatus::Failed;
                self.camera_error = Some(e.clone());
            }
        }
        result
    }

    pub async fn preload_assets(&mut self) -> PreloadReport {
        self.assets.preload().await
    }

    /// The single writer of booth UI state.
    pub fn apply(&mut self, event: &UiEvent) -> StateChange {
        self.state.apply(event)
    }

    /// Place the member overlay directly. Returns the clamped position.
    pub fn move_member(&mut self, pos: DragPosition) -> DragPosition {
        self.state.set_member_position(pos)
    }

    /// Apply an event and run the shutter and retake commands it carries.
    pub async fn dispatch(&mut self, event: &UiEvent) -> Dispatched {
        match self.apply(event) {
            StateChange::Command(UiEvent::Shutter) => {
                let captured = matches!(self.press_shutter().await, Ok(Some(_)));
                Dispatched::Shutter { captured }
            }
            StateChange::Command(UiEvent::Retake) => Dispatched::Retake {
                cleared: self.retake(),
            },
            change => Dispatched::State(change),
        }
    }

    /// Draw one preview frame at container resolution.
    ///
    /// Overlays that are still loading are skipped rather than blocking the
    /// preview.
    pub fn render_preview(&mut self) -> Result<RgbaImage, CameraError> {
        let frame = match self.source.current_frame() {
            Ok(frame) => frame,
            Err(e) => {
                if self.status == CameraStatus::Live {
                    tracing::warn!(error = %e, "Camera stream lost");
                    self.status = CameraStatus::Failed;
                    self.camera_error = Some(e.clone());
                }
                return Err(e);
            }
        };
        let scene = self.state.scene();
        let layers = self.assets.resolve_available(&scene.layers);
        Ok(rasterize(
            frame.image(),
            &scene,
            &layers,
            RenderTarget::Layout { scale: 1.0 },
        ))
    }

    /// Redraw the preview at the configured rate until `frames` have been
    /// drawn, the handle is stopped, or the camera fails.
    ///
    /// A loop stopped earlier does not block a new run: the stale handle is
    /// replaced, and `redraw_handle()` then returns the fresh one.
    pub async fn run_preview<F>(&mut self, frames: Option<u64>, mut on_frame: F) -> RedrawStats
    where
        F: FnMut(u64, &RgbaImage),
    {
        if self.redraw.is_stopped() {
            self.redraw = RedrawHandle::new();
        }
        let mut task = RedrawTask::new(self.config.capture.redraw_hz);
        if let Some(n) = frames {
            task = task.with_max_frames(n);
        }
        let handle = self.redraw.clone();
        task.run(&handle, |index| match self.render_preview() {
            Ok(image) => {
                on_frame(index, &image);
                ControlFlow::Continue(())
            }
            Err(_) => ControlFlow::Break(()),
        })
        .await
    }

    pub fn redraw_handle(&self) -> RedrawHandle {
        self.redraw.clone()
    }

    /// Whether pressing the shutter can currently produce a photo.
    pub fn shutter_enabled(&self) -> bool {
        self.status == CameraStatus::Live
            && self.machine.phase() == CapturePhase::Live
            && self
                .state
                .scene()
                .asset_ids()
                .all(|id| self.assets.is_ready(id))
    }

    /// Capture a still. `Ok(None)` when the press is ignored because a
    /// capture is running or a photo is under review.
    ///
    /// On failure nothing is retained and the booth stays live.
    pub async fn press_shutter(&mut self) -> Result<Option<&CapturedImage>, CaptureError> {
        if self.machine.begin() == ShutterOutcome::Ignored {
            return Ok(None);
        }

        let result = match self.source.current_frame() {
            Ok(frame) => {
                let scene = self.state.scene();
                self.pipeline.capture(&frame, &scene, &self.assets).await
            }
            Err(source) => Err(CaptureError::FrameUnavailable { source }),
        };

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Capture failed");
            self.capture_notice = Some(e.clone());
        } else {
            self.capture_notice = None;
        }
        self.machine.complete(result).map(Some)
    }

    /// Discard the reviewed photo. Filter and overlay settings are kept.
    pub fn retake(&mut self) -> bool {
        self.machine.retake()
    }

    pub fn captured(&self) -> Option<&CapturedImage> {
        self.machine.captured()
    }

    pub fn phase(&self) -> CapturePhase {
        self.machine.phase()
    }

    pub async fn download(&self) -> BoothResult<PathBuf> {
        let image = self
            .captured()
            .ok_or_else(|| BoothError::export("no photo to download"))?;
        self.export.download(image).await
    }

    pub fn share_offered(&self) -> bool {
        self.captured()
            .is_some_and(|image| self.export.share_offered(image))
    }

    pub async fn share(&self) -> ShareOutcome {
        match self.captured() {
            Some(image) => self.export.share(image).await,
            None => ShareOutcome::Unavailable,
        }
    }

    /// Camera errors take precedence over capture notices.
    pub fn error_surface(&self) -> Option<ErrorSurface> {
        if let Some(e) = &self.camera_error {
            return Some(ErrorSurface::Camera(e.clone()));
        }
        self.capture_notice
            .as_ref()
            .map(|e| ErrorSurface::CaptureNotice(e.clone()))
    }

    pub fn dismiss_notice(&mut self) {
        self.capture_notice = None;
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }

    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.source.info()
    }

    pub fn state(&self) -> &BoothState {
        &self.state
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    pub fn export(&self) -> &ExportSink {
        &self.export
    }

    /// Stop the preview loop and release the camera.
    pub fn shutdown(&mut self) {
        self.redraw.stop();
        self.source.close();
    }
}

impl Drop for BoothSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
