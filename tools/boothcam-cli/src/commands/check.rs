//! Check camera, overlay assets, and configuration.

use std::path::PathBuf;

use boothcam_camera::{FallbackLadder, FrameSource};
use boothcam_common::config::{config_file_path, AppConfig};
use boothcam_render_engine::{AssetStore, SharedFile, ShareTarget, SystemShare};
use boothcam_scene_model::overlay::OverlayCatalog;

pub async fn run(
    config: AppConfig,
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("Boothcam System Check");
    println!("{}", "=".repeat(50));

    let mut ok = true;

    // Config
    let path = config_path.unwrap_or_else(config_file_path);
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else {
        println!("[WARN] Config: {} not found, using defaults", path.display());
    }
    if let Err(e) = config.validate() {
        println!("[FAIL] Config invalid: {e}");
        ok = false;
    }

    // Camera
    let mut source = FrameSource::new(
        super::camera_backend(input.as_deref()),
        FallbackLadder::from_defaults(&config.camera),
    );
    match source.probe().await {
        Ok(devices) => {
            println!(
                "[OK] Camera backend '{}': {} device(s)",
                source.backend_name(),
                devices.len()
            );
            for device in &devices {
                let modes: Vec<String> = device.modes.iter().map(|m| m.to_string()).collect();
                println!(
                    "     {} ({:?}) {}",
                    device.label,
                    device.facing,
                    modes.join(", ")
                );
            }
        }
        Err(e) => {
            println!("[FAIL] Camera probe: {}", e.user_message());
            ok = false;
        }
    }
    match source.open().await {
        Ok(info) => println!(
            "[OK] Camera stream: {:?} at {} (fallback step {})",
            info.facing, info.mode, info.rung
        ),
        Err(e) => {
            println!("[FAIL] Camera stream: {}", e.user_message());
            ok = false;
        }
    }
    source.close();

    // Overlay art
    let catalog = OverlayCatalog::from_defaults(&config.overlays);
    let mut assets = AssetStore::new(&config.asset_root);
    assets.register_catalog(&catalog);
    let report = assets.preload().await;
    if !assets.settled() {
        println!("[FAIL] Overlay art: some images are still loading");
        ok = false;
    } else if report.failed.is_empty() {
        println!(
            "[OK] Overlay art: {} loaded from {}",
            report.loaded,
            config.asset_root.display()
        );
    } else {
        println!(
            "[WARN] Overlay art: {} loaded, {} missing under {}",
            report.loaded,
            report.failed.len(),
            config.asset_root.display()
        );
        for (id, reason) in &report.failed {
            println!("     {id}: {reason}");
        }
    }

    // Export
    match tokio::fs::create_dir_all(&config.output_dir).await {
        Ok(()) => println!("[OK] Download directory: {}", config.output_dir.display()),
        Err(e) => {
            println!(
                "[FAIL] Download directory {}: {e}",
                config.output_dir.display()
            );
            ok = false;
        }
    }
    let probe = SharedFile {
        name: format!("{}.{}", config.capture.file_prefix, config.capture.format.extension()),
        mime_type: config.capture.format.mime_type(),
        bytes: Vec::new(),
    };
    let share = SystemShare::in_temp_dir();
    if share.can_share(&probe) {
        println!("[OK] Share: '{}' target available", share.name());
    } else {
        println!("[WARN] Share: not available, download only");
    }

    println!();
    if ok {
        println!("Boothcam is ready.");
    } else {
        println!("Some checks failed. See above for details.");
    }

    Ok(())
}
