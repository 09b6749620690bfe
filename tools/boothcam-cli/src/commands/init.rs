//! Write a default config, optionally with placeholder overlay art.

use std::path::PathBuf;

use anyhow::Context;
use boothcam_common::config::{config_file_path, AppConfig};
use boothcam_render_engine::placeholder_art;
use boothcam_scene_model::overlay::{Anchor, OverlayCatalog};

const PORTRAIT_SIZE: (u32, u32) = (300, 400);
const BANNER_SIZE: (u32, u32) = (600, 200);

pub fn run(
    config: AppConfig,
    config_path: Option<PathBuf>,
    placeholders: bool,
    force: bool,
) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        println!("Config already exists at {} (use --force to overwrite)", path.display());
    } else {
        config
            .save_to(&path)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        println!("Config written to: {}", path.display());
    }
    println!("  Downloads: {}", config.output_dir.display());
    println!("  Overlay art: {}", config.asset_root.display());

    if !placeholders {
        return Ok(());
    }

    let catalog = OverlayCatalog::from_defaults(&config.overlays);
    let mut written = 0;
    for asset in catalog.all() {
        let target = config.asset_root.join(&asset.path);
        if target.exists() && !force {
            continue;
        }
        let (w, h) = match asset.anchor {
            Anchor::Fixed(_) => BANNER_SIZE,
            Anchor::Draggable => PORTRAIT_SIZE,
        };
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        placeholder_art(&asset.id, w, h)
            .save(&target)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        written += 1;
    }
    println!("Placeholder art written: {written} file(s)");

    Ok(())
}
