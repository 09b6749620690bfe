//! End-to-end booth flows against the synthetic camera.

use std::path::PathBuf;

use boothcam_camera::{SyntheticCamera, SyntheticControl};
use boothcam_common::config::{AppConfig, CaptureStrategy, Facing, OutputFormat};
use boothcam_common::error::{CameraError, CaptureError};
use boothcam_render_engine::{CapturePhase, NoShare, ShareOutcome};
use boothcam_scene_model::event::{PointerSource, UiEvent};
use boothcam_scene_model::filter::FilterKind;
use boothcam_scene_model::overlay::DragPosition;
use boothcam_session::{BoothSession, CameraStatus, Dispatched, ErrorSurface};
use image::{Rgba, RgbaImage};

fn config(tag: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.output_dir = std::env::temp_dir().join(format!("boothcam_e2e_{tag}"));
    config.asset_root = PathBuf::from("/nonexistent/boothcam-assets");
    config.capture.format = OutputFormat::Png;
    config
}

fn booth(config: AppConfig) -> (BoothSession, SyntheticControl) {
    let camera = SyntheticCamera::new();
    let control = camera.control();
    let session = BoothSession::new(config, Box::new(camera), Box::new(NoShare));
    (session, control)
}

/// A live booth with fixed art hidden and every member portrait loaded.
///
/// Portraits are solid blue at 9:16, the member box's aspect, so they fill
/// the box exactly.
async fn live_booth(config: AppConfig) -> (BoothSession, SyntheticControl) {
    let (mut session, control) = booth(config);
    session.start().await.unwrap();
    session.apply(&UiEvent::SetFixedArt { visible: false });
    let ids: Vec<String> = session
        .state()
        .catalog()
        .members()
        .iter()
        .map(|m| m.id.clone())
        .collect();
    for id in ids {
        session
            .assets_mut()
            .insert(id, RgbaImage::from_pixel(90, 160, Rgba([0, 0, 255, 255])));
    }
    (session, control)
}

fn is_blue(p: &Rgba<u8>) -> bool {
    p[2] > 200 && p[0] < 60 && p[1] < 60
}

#[tokio::test]
async fn permission_denied_then_retry_restarts_ladder() {
    let (mut session, control) = booth(config("denied"));
    control.deny_permission(true);

    assert_eq!(
        session.start().await.unwrap_err(),
        CameraError::PermissionDenied
    );
    assert_eq!(session.status(), CameraStatus::Failed);
    let surface = session.error_surface().unwrap();
    assert!(surface.is_blocking());
    assert_eq!(surface, ErrorSurface::Camera(CameraError::PermissionDenied));
    assert!(!session.shutter_enabled());

    control.deny_permission(false);
    let info = session.retry_camera().await.unwrap();
    assert_eq!(info.rung, 0);
    assert_eq!(control.attempts()[0].facing, Facing::Environment);
    assert_eq!(session.status(), CameraStatus::Live);
    assert!(session.error_surface().is_none());
}

#[tokio::test]
async fn rear_camera_busy_falls_back_silently() {
    let (mut session, control) = booth(config("fallback"));
    control.set_busy(Facing::Environment, true);

    let info = session.start().await.unwrap();
    assert_eq!(info.facing, Facing::User);
    assert_eq!(info.rung, 1);

    let attempts = control.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].width, attempts[1].width);
    assert_eq!(attempts[0].height, attempts[1].height);

    assert_eq!(session.status(), CameraStatus::Live);
    assert!(session.error_surface().is_none());
    assert!(session.render_preview().is_ok());
}

#[tokio::test]
async fn fallback_capture_frames_what_the_preview_shows() {
    let (mut session, control) = booth(config("fallback_framing"));
    control.set_busy(Facing::Environment, true);
    session.start().await.unwrap();
    session.apply(&UiEvent::SetFixedArt { visible: false });
    session
        .assets_mut()
        .insert("maya", RgbaImage::from_pixel(90, 160, Rgba([0, 0, 255, 255])));
    session.apply(&UiEvent::SelectMember { id: "maya".into() });

    let info = session.stream_info().unwrap();
    assert_eq!((info.mode.width, info.mode.height), (640, 480));

    let preview = session.render_preview().unwrap();
    assert_eq!(preview.dimensions(), (360, 640));
    // Member box in layout pixels: x 272..344, y 362..490.
    assert!(is_blue(preview.get_pixel(308, 426)));

    let captured = session.press_shutter().await.unwrap().unwrap().clone();
    // The 9:16 centre of the 640x480 frame, at native scale.
    assert_eq!((captured.width(), captured.height()), (270, 480));
    assert_eq!(
        captured.width() as u64 * preview.height() as u64,
        captured.height() as u64 * preview.width() as u64
    );
    let image = image::load_from_memory(captured.bytes()).unwrap().to_rgba8();
    // Same box at 0.75 scale: x 204..258, y 271.5..367.5.
    assert!(is_blue(image.get_pixel(231, 319)));
    assert!(!is_blue(image.get_pixel(190, 319)));
    assert!(!is_blue(image.get_pixel(231, 255)));
}

#[tokio::test]
async fn dragged_overlay_lands_at_same_fraction_in_capture() {
    let (mut session, _control) = live_booth(config("drag")).await;
    session.apply(&UiEvent::SelectMember { id: "jurin".into() });
    assert_eq!(session.state().member_position(), DragPosition::new(16.0, 150.0));

    // Grab inside the box, then move so the box sits 40px from the right
    // and 200px from the bottom.
    session.apply(&UiEvent::PointerDown {
        x: 300.0,
        y: 400.0,
        source: PointerSource::Mouse,
    });
    session.apply(&UiEvent::PointerMove { x: 276.0, y: 350.0 });
    session.apply(&UiEvent::PointerUp);
    assert_eq!(session.state().member_position(), DragPosition::new(40.0, 200.0));

    let fraction = session.state().member_fraction();
    assert!((fraction.x - 248.0 / 360.0).abs() < 1e-9);
    assert!((fraction.y - 312.0 / 640.0).abs() < 1e-9);

    let captured = session.press_shutter().await.unwrap().unwrap().clone();
    assert_eq!((captured.width(), captured.height()), (720, 1280));
    let image = image::load_from_memory(captured.bytes()).unwrap().to_rgba8();

    // Box on the 720x1280 still: x 496..640, y 624..880.
    assert!(is_blue(image.get_pixel(568, 752)));
    assert!(is_blue(image.get_pixel(500, 630)));
    assert!(is_blue(image.get_pixel(636, 876)));
    assert!(!is_blue(image.get_pixel(480, 752)));
    assert!(!is_blue(image.get_pixel(568, 600)));
    assert!(!is_blue(image.get_pixel(568, 900)));
}

#[tokio::test]
async fn retake_keeps_filter_and_overlay() {
    let (mut session, _control) = live_booth(config("retake")).await;
    session.apply(&UiEvent::SelectMember { id: "maya".into() });
    session.apply(&UiEvent::SetFilter {
        kind: FilterKind::Sepia,
    });
    session.apply(&UiEvent::SetBrightness { pct: 130 });

    assert_eq!(
        session.dispatch(&UiEvent::Shutter).await,
        Dispatched::Shutter { captured: true }
    );
    assert_eq!(session.phase(), CapturePhase::Review);
    assert!(!session.shutter_enabled());

    assert_eq!(
        session.dispatch(&UiEvent::Retake).await,
        Dispatched::Retake { cleared: true }
    );
    assert_eq!(session.phase(), CapturePhase::Live);
    assert!(session.captured().is_none());
    assert_eq!(session.state().selected_member(), Some("maya"));
    assert_eq!(session.state().filter().kind, FilterKind::Sepia);
    assert_eq!(session.state().filter().brightness_pct(), 130);
    assert!(session.render_preview().is_ok());
    assert!(session.shutter_enabled());
}

#[tokio::test]
async fn no_share_host_still_downloads() {
    let config = config("download");
    let dir = config.output_dir.clone();
    let _ = std::fs::remove_dir_all(&dir);

    let (mut session, _control) = live_booth(config).await;
    session.press_shutter().await.unwrap();

    assert!(!session.share_offered());
    assert_eq!(session.share().await, ShareOutcome::Unavailable);

    let path = session.download().await.unwrap();
    assert!(path.starts_with(&dir));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("xg-camera-"));
    assert!(name.ends_with("Z.png"));
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, session.captured().unwrap().bytes());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn shutter_is_ignored_during_review() {
    let (mut session, _control) = live_booth(config("reentrant")).await;
    let first = session.press_shutter().await.unwrap().unwrap().clone();
    assert!(session.press_shutter().await.unwrap().is_none());
    assert_eq!(session.captured(), Some(&first));
}

#[tokio::test]
async fn same_scene_captures_identically() {
    let (mut session, _control) = live_booth(config("repeat")).await;
    session.apply(&UiEvent::SelectMember { id: "chisa".into() });
    session.apply(&UiEvent::SetFilter {
        kind: FilterKind::Grayscale,
    });

    let first = session.press_shutter().await.unwrap().unwrap().clone();
    session.retake();
    let second = session.press_shutter().await.unwrap().unwrap().clone();
    assert_eq!(first.bytes(), second.bytes());
}

#[tokio::test]
async fn snapshot_strategy_captures_at_layout_size() {
    let mut config = config("snapshot");
    config.capture.strategy = CaptureStrategy::Snapshot;
    config.capture.device_pixel_ratio = 2.0;
    let (mut session, _control) = live_booth(config).await;

    let captured = session.press_shutter().await.unwrap().unwrap();
    assert_eq!((captured.width(), captured.height()), (720, 1280));
}

#[tokio::test]
async fn missing_overlay_fails_capture_and_stays_live() {
    let (mut session, _control) = booth(config("missing"));
    session.start().await.unwrap();
    session.apply(&UiEvent::SetFixedArt { visible: false });
    session.apply(&UiEvent::SelectMember { id: "hinata".into() });
    assert!(!session.shutter_enabled());

    let err = session.press_shutter().await.unwrap_err();
    assert_eq!(err, CaptureError::asset_not_ready("hinata"));
    assert_eq!(session.phase(), CapturePhase::Live);
    assert!(session.captured().is_none());
    assert!(matches!(
        session.error_surface(),
        Some(ErrorSurface::CaptureNotice(CaptureError::AssetNotReady { .. }))
    ));

    // The preview keeps running without the missing portrait.
    assert!(session.render_preview().is_ok());
    session.dismiss_notice();
    assert!(session.error_surface().is_none());
}

#[tokio::test]
async fn lost_camera_fails_capture_then_surfaces() {
    let (mut session, control) = live_booth(config("lost")).await;
    control.fail_reads(true);

    let err = session.press_shutter().await.unwrap_err();
    assert!(matches!(err, CaptureError::FrameUnavailable { .. }));
    assert_eq!(session.phase(), CapturePhase::Live);

    assert!(session.render_preview().is_err());
    assert_eq!(session.status(), CameraStatus::Failed);
    // Camera errors take precedence over the capture notice.
    assert!(session.error_surface().unwrap().is_blocking());

    control.fail_reads(false);
    session.retry_camera().await.unwrap();
    assert_eq!(session.status(), CameraStatus::Live);
}

#[tokio::test]
async fn shutdown_releases_camera() {
    let (mut session, control) = booth(config("shutdown"));
    session.start().await.unwrap();
    assert_eq!(control.open_streams(), 1);
    let handle = session.redraw_handle();
    drop(session);
    assert_eq!(control.open_streams(), 0);
    assert!(handle.is_stopped());
}
