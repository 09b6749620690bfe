//! Run the live preview loop.

use std::io::Write;
use std::path::PathBuf;

use boothcam_common::clock::{PreviewClock, RateController};
use boothcam_common::config::AppConfig;
use boothcam_render_engine::NoShare;
use image::RgbaImage;

use crate::SceneArgs;

pub async fn run(
    config: AppConfig,
    scene: SceneArgs,
    frames: u64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let redraw_hz = config.capture.redraw_hz;
    let mut session = super::open_session(config, &scene, Box::new(NoShare)).await?;

    let handle = session.redraw_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.stop();
        }
    });

    if frames == 0 {
        println!("Previewing at {redraw_hz} Hz. Press Ctrl+C to stop...");
    } else {
        println!("Previewing {frames} frame(s) at {redraw_hz} Hz...");
    }

    let clock = PreviewClock::start();
    let mut progress = RateController::new(1);
    let mut last: Option<RgbaImage> = None;
    let keep_last = output.is_some();

    let limit = (frames > 0).then_some(frames);
    let stats = session
        .run_preview(limit, |index, image| {
            if progress.should_tick(clock.elapsed_ns()) {
                print!(
                    "\r  Frame {} ({}x{}, {:.1}s)  ",
                    index + 1,
                    image.width(),
                    image.height(),
                    clock.elapsed_secs()
                );
                let _ = std::io::stdout().flush();
            }
            if keep_last {
                last = Some(image.clone());
            }
        })
        .await;

    println!();
    println!(
        "Drew {} frame(s) in {:.2}s ({:.1} fps)",
        stats.frames,
        stats.elapsed_secs,
        stats.fps()
    );

    if let Some(surface) = session.error_surface() {
        println!("Preview stopped: {}", surface.message());
    }

    if let (Some(path), Some(image)) = (output, last) {
        image.save(&path)?;
        println!("Last frame saved to: {}", path.display());
    }

    session.shutdown();
    Ok(())
}
