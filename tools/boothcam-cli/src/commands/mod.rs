pub mod capture;
pub mod catalog;
pub mod check;
pub mod init;
pub mod preview;

use std::path::Path;

use anyhow::Context;
use boothcam_camera::{CameraBackend, StillImageCamera, SyntheticCamera};
use boothcam_common::config::AppConfig;
use boothcam_render_engine::ShareTarget;
use boothcam_scene_model::event::{parse_events, UiEvent};
use boothcam_scene_model::overlay::DragPosition;
use boothcam_session::BoothSession;

use crate::SceneArgs;

/// Load the config at `path`, or the standard one. A missing file means
/// defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) if path.exists() => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        Some(_) => Ok(AppConfig::default()),
        None => Ok(AppConfig::load()),
    }
}

pub fn camera_backend(input: Option<&Path>) -> Box<dyn CameraBackend> {
    match input {
        Some(path) => Box::new(StillImageCamera::new(path)),
        None => Box::new(SyntheticCamera::new()),
    }
}

/// Start a session and bring the scene to the state the arguments ask for.
pub async fn open_session(
    config: AppConfig,
    scene: &SceneArgs,
    share_target: Box<dyn ShareTarget>,
) -> anyhow::Result<BoothSession> {
    let backend = camera_backend(scene.input.as_deref());
    let mut session = BoothSession::new(config, backend, share_target);

    let info = session
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
    println!(
        "Camera: {:?} at {} (fallback step {})",
        info.facing, info.mode, info.rung
    );

    apply_scene(&mut session, scene).await?;
    Ok(session)
}

async fn apply_scene(session: &mut BoothSession, scene: &SceneArgs) -> anyhow::Result<()> {
    if let Some(path) = &scene.events {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read events {}", path.display()))?;
        let events = parse_events(&content)
            .with_context(|| format!("Invalid events in {}", path.display()))?;
        for timed in &events {
            session.dispatch(&timed.event).await;
        }
        println!("Replayed {} event(s)", events.len());
    }

    let mut events = Vec::new();
    if scene.no_fixed_art {
        events.push(UiEvent::SetFixedArt { visible: false });
    }
    if let Some(id) = &scene.member {
        if session.state().selected_member() != Some(id.as_str()) {
            events.push(UiEvent::SelectMember { id: id.clone() });
        }
    }
    if let Some(kind) = scene.filter {
        events.push(UiEvent::SetFilter { kind });
    }
    if let Some(pct) = scene.brightness {
        events.push(UiEvent::SetBrightness { pct });
    }
    if let Some(pct) = scene.contrast {
        events.push(UiEvent::SetContrast { pct });
    }
    for event in &events {
        session.apply(event);
    }

    if let Some(at) = &scene.at {
        let requested = parse_position(at)?;
        let placed = session.move_member(requested);
        if placed != requested {
            println!(
                "Overlay position clamped to {},{}",
                placed.x_from_right, placed.y_from_bottom
            );
        }
    }
    Ok(())
}

/// `"X,Y"` in pixels from the right and bottom edges.
pub fn parse_position(s: &str) -> anyhow::Result<DragPosition> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Position must look like X,Y, got {s:?}"))?;
    let x: f64 = x.trim().parse().context("Invalid X position")?;
    let y: f64 = y.trim().parse().context("Invalid Y position")?;
    Ok(DragPosition::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("40,200").unwrap(), DragPosition::new(40.0, 200.0));
        assert_eq!(parse_position(" 1.5 , 2 ").unwrap(), DragPosition::new(1.5, 2.0));
        assert!(parse_position("40").is_err());
        assert!(parse_position("a,b").is_err());
    }
}
