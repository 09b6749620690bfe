//! List overlay art and whether its files exist.

use boothcam_common::config::AppConfig;
use boothcam_scene_model::overlay::{Anchor, OverlayCatalog};
use serde::Serialize;

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: &'a str,
    label: &'a str,
    kind: &'static str,
    path: String,
    present: bool,
}

pub fn run(config: AppConfig, json: bool) -> anyhow::Result<()> {
    let catalog = OverlayCatalog::from_defaults(&config.overlays);
    let entries: Vec<CatalogEntry> = catalog
        .all()
        .map(|asset| {
            let path = config.asset_root.join(&asset.path);
            CatalogEntry {
                id: &asset.id,
                label: &asset.label,
                kind: match asset.anchor {
                    Anchor::Fixed(_) => "fixed",
                    Anchor::Draggable => "member",
                },
                present: path.is_file(),
                path: path.display().to_string(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Overlay art under {}", config.asset_root.display());
    for entry in &entries {
        println!(
            "  [{}] {:<7} {:<14} {}",
            if entry.present { "x" } else { " " },
            entry.kind,
            entry.id,
            entry.label
        );
    }
    let missing = entries.iter().filter(|e| !e.present).count();
    if missing > 0 {
        println!();
        println!("{missing} file(s) missing. `boothcam init --placeholders` writes stand-ins.");
    }
    Ok(())
}
