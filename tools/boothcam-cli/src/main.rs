//! Boothcam CLI: run the photo booth pipeline from the terminal.
//!
//! Usage:
//!   boothcam capture [OPTIONS]   Take one photo and save it
//!   boothcam preview [OPTIONS]   Run the live preview loop
//!   boothcam check               Check camera, assets, and config
//!   boothcam catalog             List overlay art
//!   boothcam init                Write a default config

use std::path::PathBuf;

use boothcam_scene_model::filter::FilterKind;
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "boothcam",
    about = "Photo booth with live filters and overlay art",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Camera and scene options shared by capture and preview.
#[derive(Args, Debug, Clone)]
pub struct SceneArgs {
    /// Replay this image as the camera instead of the synthetic test pattern
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Member portrait to overlay
    #[arg(short, long)]
    member: Option<String>,

    /// Member overlay position as pixels from the right and bottom edges
    #[arg(long, value_name = "X,Y")]
    at: Option<String>,

    /// Filter: none, grayscale, sepia, blur
    #[arg(short, long)]
    filter: Option<FilterKind>,

    /// Brightness percent (100 = unchanged)
    #[arg(long)]
    brightness: Option<u16>,

    /// Contrast percent (100 = unchanged)
    #[arg(long)]
    contrast: Option<u16>,

    /// Hide the fixed live art
    #[arg(long)]
    no_fixed_art: bool,

    /// Replay UI events from a JSONL file before rendering
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take one photo and save it
    Capture {
        #[command(flatten)]
        scene: SceneArgs,

        /// Download directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Capture strategy: programmatic or snapshot
        #[arg(long)]
        strategy: Option<String>,

        /// Output format: jpeg or png
        #[arg(long)]
        format: Option<String>,

        /// Also hand the photo to the desktop's default viewer
        #[arg(long)]
        share: bool,

        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the live preview loop
    Preview {
        #[command(flatten)]
        scene: SceneArgs,

        /// Frames to draw (0 = until Ctrl+C)
        #[arg(short = 'n', long, default_value = "120")]
        frames: u64,

        /// Save the last preview frame as PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check camera, overlay assets, and configuration
    Check {
        /// Check this image as the camera instead of the synthetic test pattern
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List overlay art and whether its files exist
    Catalog {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init {
        /// Also write placeholder overlay art under the asset root
        #[arg(long)]
        placeholders: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    boothcam_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Capture {
            scene,
            output,
            strategy,
            format,
            share,
            json,
        } => commands::capture::run(config, scene, output, strategy, format, share, json).await,
        Commands::Preview {
            scene,
            frames,
            output,
        } => commands::preview::run(config, scene, frames, output).await,
        Commands::Check { input } => commands::check::run(config, cli.config, input).await,
        Commands::Catalog { json } => commands::catalog::run(config, json),
        Commands::Init {
            placeholders,
            force,
        } => commands::init::run(config, cli.config, placeholders, force),
    }
}
