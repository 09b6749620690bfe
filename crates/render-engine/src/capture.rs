//! Capture: rasterize the current scene into an encoded still, and the
//! shutter state machine around it.

use std::sync::Arc;
use std::time::Instant;

use boothcam_camera::Frame;
use boothcam_common::config::{CaptureDefaults, CaptureStrategy, OutputFormat};
use boothcam_common::error::CaptureError;
use boothcam_filter_engine::FilterPipeline;
use boothcam_scene_model::geometry::{cover_crop, CompositionContext, PixelRect, Size};
use boothcam_scene_model::state::SceneSnapshot;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::assets::AssetStore;
use crate::compositor::{Compositor, ResolvedLayer};
use crate::encode::encode;

/// Resolution a scene is rasterized at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderTarget {
    /// The camera's native pixels, center-cropped to the container's aspect
    /// without resampling. Layout scales by crop / container.
    Native,
    /// The on-screen container times `scale`, frame cover-cropped into it.
    Layout { scale: f64 },
}

/// Draw the filtered frame and overlay layers for `scene`.
///
/// Blur and shadow radii are given in layout pixels and scaled to the
/// target, so every target shows the same picture.
pub fn rasterize(
    frame: &RgbaImage,
    scene: &SceneSnapshot,
    layers: &[ResolvedLayer],
    target: RenderTarget,
) -> RgbaImage {
    let frame_size = Size::from_u32(frame.width(), frame.height());
    let (mut base, scale) = match target {
        RenderTarget::Native => {
            let (cx, cy, cw, ch) = crop_bounds(frame, cover_crop(frame_size, scene.container));
            let cropped = if (cw, ch) == frame.dimensions() {
                frame.clone()
            } else {
                imageops::crop_imm(frame, cx, cy, cw, ch).to_image()
            };
            let ctx = CompositionContext::new(scene.container, Size::from_u32(cw, ch));
            (cropped, ctx.scale_x())
        }
        RenderTarget::Layout { scale } => {
            let (w, h) = scene.container.scaled(scale).to_pixels();
            (cover_fill(frame, w, h), scale)
        }
    };
    FilterPipeline::with_scale(scene.filter, scale as f32).apply_in_place(&mut base);
    Compositor::new(scale as f32).compose(&mut base, layers);
    base
}

/// Whole-pixel bounds of `crop`, kept inside `frame`.
fn crop_bounds(frame: &RgbaImage, crop: PixelRect) -> (u32, u32, u32, u32) {
    let cx = (crop.x.round().max(0.0) as u32).min(frame.width().saturating_sub(1));
    let cy = (crop.y.round().max(0.0) as u32).min(frame.height().saturating_sub(1));
    let cw = (crop.w.round() as u32).clamp(1, (frame.width() - cx).max(1));
    let ch = (crop.h.round() as u32).clamp(1, (frame.height() - cy).max(1));
    (cx, cy, cw, ch)
}

/// Center-crop `frame` to the aspect of `w`x`h` and scale it to fill.
fn cover_fill(frame: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let crop = cover_crop(
        Size::from_u32(frame.width(), frame.height()),
        Size::from_u32(w, h),
    );
    let (cx, cy, cw, ch) = crop_bounds(frame, crop);
    let cropped = imageops::crop_imm(frame, cx, cy, cw, ch).to_image();
    if cropped.dimensions() == (w, h) {
        cropped
    } else {
        imageops::resize(&cropped, w, h, FilterType::Triangle)
    }
}

/// An encoded still. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    bytes: Arc<[u8]>,
    format: OutputFormat,
    width: u32,
    height: u32,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>, format: OutputFormat, width: u32, height: u32) -> Self {
        Self {
            bytes: bytes.into(),
            format,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Produces stills with one strategy and output format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturePipeline {
    strategy: CaptureStrategy,
    format: OutputFormat,
    device_pixel_ratio: f64,
}

impl CapturePipeline {
    pub fn new(strategy: CaptureStrategy, format: OutputFormat, device_pixel_ratio: f64) -> Self {
        Self {
            strategy,
            format,
            device_pixel_ratio,
        }
    }

    pub fn from_defaults(defaults: &CaptureDefaults) -> Self {
        Self::new(
            defaults.strategy,
            defaults.format,
            defaults.device_pixel_ratio,
        )
    }

    pub fn strategy(&self) -> CaptureStrategy {
        self.strategy
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn target(&self) -> RenderTarget {
        match self.strategy {
            CaptureStrategy::Programmatic => RenderTarget::Native,
            CaptureStrategy::Snapshot => RenderTarget::Layout {
                scale: self.device_pixel_ratio,
            },
        }
    }

    /// Rasterize and encode `frame` with `scene`.
    ///
    /// Every overlay the scene draws must be loaded, otherwise this fails
    /// with `AssetNotReady` before any work is done.
    pub async fn capture(
        &self,
        frame: &Frame,
        scene: &SceneSnapshot,
        assets: &AssetStore,
    ) -> Result<CapturedImage, CaptureError> {
        let layers = assets.resolve(&scene.layers)?;
        let image = frame.shared_image();
        let scene = scene.clone();
        let target = self.target();
        let format = self.format;
        let started = Instant::now();

        let captured = tokio::task::spawn_blocking(move || {
            let composed = rasterize(&image, &scene, &layers, target);
            let bytes = encode(&composed, format)?;
            Ok::<_, CaptureError>(CapturedImage::new(
                bytes,
                format,
                composed.width(),
                composed.height(),
            ))
        })
        .await
        .map_err(|e| CaptureError::rasterization(format!("capture task failed: {e}")))??;

        tracing::info!(
            strategy = ?self.strategy,
            width = captured.width(),
            height = captured.height(),
            bytes = captured.bytes().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Still captured"
        );
        Ok(captured)
    }
}

/// Where the booth is in the shutter cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Live preview, shutter armed.
    Live,
    /// A capture is running; further shutter presses are ignored.
    Capturing,
    /// A still is shown for download, share, or retake.
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutterOutcome {
    Started,
    /// Not in the live phase.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct CaptureMachine {
    phase: CapturePhase,
    captured: Option<CapturedImage>,
}

impl Default for CaptureMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureMachine {
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::Live,
            captured: None,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn captured(&self) -> Option<&CapturedImage> {
        self.captured.as_ref()
    }

    pub fn begin(&mut self) -> ShutterOutcome {
        if self.phase == CapturePhase::Live {
            self.phase = CapturePhase::Capturing;
            ShutterOutcome::Started
        } else {
            tracing::debug!(phase = ?self.phase, "Shutter ignored");
            ShutterOutcome::Ignored
        }
    }

    /// Finish the running capture. Failure returns to `Live` with nothing
    /// retained.
    pub fn complete(
        &mut self,
        result: Result<CapturedImage, CaptureError>,
    ) -> Result<&CapturedImage, CaptureError> {
        if self.phase != CapturePhase::Capturing {
            return Err(CaptureError::Busy);
        }
        match result {
            Ok(image) => {
                self.phase = CapturePhase::Review;
                Ok(self.captured.insert(image))
            }
            Err(e) => {
                self.phase = CapturePhase::Live;
                self.captured = None;
                Err(e)
            }
        }
    }

    /// Drop the reviewed still and go live again.
    pub fn retake(&mut self) -> bool {
        if self.phase != CapturePhase::Review {
            return false;
        }
        self.phase = CapturePhase::Live;
        self.captured = None;
        true
    }
}
