//! Take one photo and save it.

use std::path::PathBuf;

use boothcam_common::config::{AppConfig, CaptureStrategy, OutputFormat};
use boothcam_render_engine::{CapturePhase, NoShare, ShareOutcome, ShareTarget, SystemShare};
use boothcam_session::BoothSession;
use serde::Serialize;

use crate::SceneArgs;

#[derive(Serialize)]
struct CaptureSummary {
    path: PathBuf,
    width: u32,
    height: u32,
    bytes: usize,
    mime_type: &'static str,
    strategy: CaptureStrategy,
    member: Option<String>,
    filter: String,
    shared: Option<String>,
}

pub async fn run(
    mut config: AppConfig,
    scene: SceneArgs,
    output: Option<PathBuf>,
    strategy: Option<String>,
    format: Option<String>,
    share: bool,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(strategy) = strategy {
        config.capture.strategy = match strategy.as_str() {
            "programmatic" => CaptureStrategy::Programmatic,
            "snapshot" => CaptureStrategy::Snapshot,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown strategy: {strategy}. Use: programmatic, snapshot"
                ));
            }
        };
    }
    if let Some(format) = format {
        config.capture.format = match format.as_str() {
            "jpeg" | "jpg" => OutputFormat::Jpeg,
            "png" => OutputFormat::Png,
            _ => return Err(anyhow::anyhow!("Unknown format: {format}. Use: jpeg, png")),
        };
    }
    let strategy = config.capture.strategy;

    let share_target: Box<dyn ShareTarget> = if share {
        Box::new(SystemShare::in_temp_dir())
    } else {
        Box::new(NoShare)
    };
    let mut session = super::open_session(config, &scene, share_target).await?;

    if !session.shutter_enabled() {
        let missing: Vec<String> = session
            .state()
            .scene()
            .asset_ids()
            .filter(|id| !session.assets().is_ready(id))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            println!("Missing overlay art: {}", missing.join(", "));
            println!("Run `boothcam init --placeholders` or use --no-fixed-art.");
        }
    }

    if take_photo(&mut session).await? {
        println!("Using the photo taken by the event script");
    }
    let (width, height, bytes, mime_type) = match session.captured() {
        Some(image) => (
            image.width(),
            image.height(),
            image.bytes().len(),
            image.mime_type(),
        ),
        None => return Err(anyhow::anyhow!("No photo was captured")),
    };

    let path = session.download().await?;

    let shared = if share {
        let outcome = session.share().await;
        Some(match outcome {
            ShareOutcome::Shared => "shared".to_string(),
            ShareOutcome::Cancelled => "cancelled".to_string(),
            ShareOutcome::Unavailable => "unavailable".to_string(),
            ShareOutcome::Failed(message) => format!("failed: {message}"),
        })
    } else {
        None
    };

    let state = session.state();
    let summary = CaptureSummary {
        path,
        width,
        height,
        bytes,
        mime_type,
        strategy,
        member: state.selected_member().map(str::to_string),
        filter: state.filter().css(),
        shared,
    };
    session.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Photo saved to: {}", summary.path.display());
    println!("  Size: {}x{}", summary.width, summary.height);
    println!("  Format: {} ({} bytes)", summary.mime_type, summary.bytes);
    println!("  Strategy: {:?}", summary.strategy);
    println!("  Filter: {}", summary.filter);
    if let Some(member) = &summary.member {
        println!("  Member: {member}");
    }
    if let Some(shared) = &summary.shared {
        println!("  Share: {shared}");
    }

    Ok(())
}

/// Press the shutter unless a replayed script already left a photo under
/// review. Returns `true` when the reviewed photo is reused.
async fn take_photo(session: &mut BoothSession) -> anyhow::Result<bool> {
    if session.phase() == CapturePhase::Review {
        return Ok(true);
    }
    match session.press_shutter().await {
        Ok(Some(_)) => Ok(false),
        Ok(None) => Err(anyhow::anyhow!("Shutter ignored: a capture is already running")),
        Err(e) => {
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boothcam_camera::SyntheticCamera;
    use boothcam_scene_model::event::UiEvent;
    use boothcam_session::Dispatched;

    async fn live_session() -> BoothSession {
        let mut config = AppConfig::default();
        config.asset_root = PathBuf::from("/nonexistent/boothcam-assets");
        let mut session =
            BoothSession::new(config, Box::new(SyntheticCamera::new()), Box::new(NoShare));
        session.start().await.unwrap();
        session.apply(&UiEvent::SetFixedArt { visible: false });
        session
    }

    #[tokio::test]
    async fn test_take_photo_presses_shutter() {
        let mut session = live_session().await;
        assert!(!take_photo(&mut session).await.unwrap());
        assert_eq!(session.phase(), CapturePhase::Review);
        assert!(session.captured().is_some());
    }

    #[tokio::test]
    async fn test_take_photo_reuses_scripted_shutter() {
        let mut session = live_session().await;
        assert_eq!(
            session.dispatch(&UiEvent::Shutter).await,
            Dispatched::Shutter { captured: true }
        );
        let scripted = session.captured().cloned().unwrap();

        assert!(take_photo(&mut session).await.unwrap());
        assert_eq!(session.captured(), Some(&scripted));
    }

    #[tokio::test]
    async fn test_take_photo_reports_missing_art() {
        let mut config = AppConfig::default();
        config.asset_root = PathBuf::from("/nonexistent/boothcam-assets");
        let mut session =
            BoothSession::new(config, Box::new(SyntheticCamera::new()), Box::new(NoShare));
        session.start().await.unwrap();
        assert!(take_photo(&mut session).await.is_err());
        assert_eq!(session.phase(), CapturePhase::Live);
    }
}
