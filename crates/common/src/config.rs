//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BoothError, BoothResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory downloads are written to.
    pub output_dir: PathBuf,

    /// Root that overlay image paths are resolved against.
    pub asset_root: PathBuf,

    /// Camera acquisition defaults.
    #[serde(default)]
    pub camera: CameraDefaults,

    /// Capture and preview defaults.
    #[serde(default)]
    pub capture: CaptureDefaults,

    /// Overlay catalog and drag limits.
    #[serde(default)]
    pub overlays: OverlayDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Rear camera, pointing away from the user.
    #[default]
    Environment,
    /// Front "selfie" camera.
    User,
}

/// A `{min, ideal, max}` constraint on one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub min: u32,
    pub ideal: u32,
    pub max: u32,
}

impl DimensionRange {
    pub const fn new(min: u32, ideal: u32, max: u32) -> Self {
        Self { min, ideal, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Camera acquisition defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDefaults {
    /// Width constraint for the first two rungs of the fallback ladder.
    pub width: DimensionRange,

    /// Height constraint for the first two rungs of the fallback ladder.
    pub height: DimensionRange,

    /// Preferred aspect ratio (width / height).
    pub aspect_ratio: f64,

    /// Resolution used by the last rung of the fallback ladder.
    pub minimal_width: u32,
    pub minimal_height: u32,
}

/// How a still is produced when the shutter is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStrategy {
    /// Redraw the raw frame, filters, and overlays at native frame resolution.
    #[default]
    Programmatic,
    /// Rasterize the on-screen layout at container size times pixel ratio.
    Snapshot,
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Capture and preview defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDefaults {
    /// Capture strategy selected when the pipeline is built.
    pub strategy: CaptureStrategy,

    /// Encoded output format.
    pub format: OutputFormat,

    /// Prefix for downloaded and shared file names.
    pub file_prefix: String,

    /// Device pixel ratio used by the snapshot strategy.
    pub device_pixel_ratio: f64,

    /// On-screen preview container size in CSS pixels.
    pub container_width: u32,
    pub container_height: u32,

    /// Live preview redraw rate (Hz).
    pub redraw_hz: u32,
}

/// A selectable member portrait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub id: String,
    pub name: String,
    pub image: PathBuf,
}

/// A fixed piece of art anchored to the bottom of the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedArtEntry {
    pub id: String,
    pub image: PathBuf,
    /// Width as a fraction of the base frame width.
    pub width_fraction: f64,
    /// Gap between the art's bottom edge and the frame bottom, as a fraction of frame height.
    pub bottom_fraction: f64,
}

/// Overlay catalog and drag limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayDefaults {
    pub members: Vec<MemberEntry>,

    /// Fixed art drawn on every frame, in draw order.
    pub fixed: Vec<FixedArtEntry>,

    /// Draggable box size as a fraction of the container (both axes).
    pub member_box_fraction: f64,

    /// Smallest allowed distance from the container's right edge (px).
    pub min_inset_x: f64,

    /// Smallest allowed distance from the container's bottom edge (px).
    /// Keeps the dragged portrait clear of the shutter button.
    pub min_inset_y: f64,

    /// Initial drag position measured from the right/bottom edges (px).
    pub initial_x: f64,
    pub initial_y: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "boothcam=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

const MEMBER_IDS: [&str; 7] = [
    "jurin", "chisa", "harvey", "hinata", "juria", "maya", "cocona",
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs_default_output(),
            asset_root: PathBuf::from("public"),
            camera: CameraDefaults::default(),
            capture: CaptureDefaults::default(),
            overlays: OverlayDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            width: DimensionRange::new(320, 720, 1280),
            height: DimensionRange::new(240, 1280, 1920),
            aspect_ratio: 9.0 / 16.0,
            minimal_width: 640,
            minimal_height: 480,
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            strategy: CaptureStrategy::Programmatic,
            format: OutputFormat::Jpeg,
            file_prefix: "xg-camera".to_string(),
            device_pixel_ratio: 2.0,
            container_width: 360,
            container_height: 640,
            redraw_hz: 60,
        }
    }
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        let members = MEMBER_IDS
            .iter()
            .map(|id| MemberEntry {
                id: id.to_string(),
                name: id.to_uppercase(),
                image: PathBuf::from("images/member").join(format!("{id}.png")),
            })
            .collect();

        Self {
            members,
            fixed: vec![
                FixedArtEntry {
                    id: "live_member".to_string(),
                    image: PathBuf::from("images/live_member.png"),
                    width_fraction: 0.6,
                    bottom_fraction: 0.3,
                },
                FixedArtEntry {
                    id: "live_logo".to_string(),
                    image: PathBuf::from("images/live_logo.png"),
                    width_fraction: 0.4,
                    bottom_fraction: 0.175,
                },
            ],
            member_box_fraction: 0.2,
            min_inset_x: 0.0,
            min_inset_y: 150.0,
            initial_x: 16.0,
            initial_y: 112.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> BoothResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> BoothResult<()> {
        let cam = &self.camera;
        for (label, range) in [("width", cam.width), ("height", cam.height)] {
            if range.min > range.max || range.max == 0 {
                return Err(BoothError::config(format!(
                    "camera {label} range {}..{} is empty",
                    range.min, range.max
                )));
            }
        }
        if cam.minimal_width == 0 || cam.minimal_height == 0 {
            return Err(BoothError::config("minimal camera resolution must be non-zero"));
        }
        if self.capture.container_width == 0 || self.capture.container_height == 0 {
            return Err(BoothError::config("preview container must be non-empty"));
        }
        let dpr = self.capture.device_pixel_ratio;
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(BoothError::config("device pixel ratio must be positive"));
        }
        if self.capture.redraw_hz == 0 {
            return Err(BoothError::config("redraw rate must be at least 1 Hz"));
        }
        if !(0.0..=1.0).contains(&self.overlays.member_box_fraction) {
            return Err(BoothError::config("member box fraction must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("boothcam").join("config.json")
}

/// Default download directory.
fn dirs_default_output() -> PathBuf {
    let base = std::env::var("XDG_PICTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join("Pictures")
        });
    base.join("boothcam")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_booth_layout() {
        let config = AppConfig::default();
        assert_eq!(config.overlays.members.len(), 7);
        assert_eq!(config.overlays.members[0].name, "JURIN");
        assert_eq!(
            config.overlays.members[6].image,
            PathBuf::from("images/member/cocona.png")
        );
        assert_eq!(config.camera.width.ideal, 720);
        assert_eq!(config.capture.format.extension(), "jpg");
        config.validate().unwrap();
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.capture.file_prefix, "xg-camera");
        assert_eq!(parsed.capture.strategy, CaptureStrategy::Programmatic);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut config = AppConfig::default();
        config.camera.width = DimensionRange::new(800, 720, 640);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_reads_partial_file() {
        let dir = std::env::temp_dir().join("boothcam_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{"output_dir":"/tmp/out","asset_root":"assets","capture":{
                "strategy":"snapshot","format":"png","file_prefix":"booth",
                "device_pixel_ratio":3.0,"container_width":390,"container_height":693,
                "redraw_hz":30}}"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.capture.strategy, CaptureStrategy::Snapshot);
        assert_eq!(config.capture.format.mime_type(), "image/png");
        assert_eq!(config.overlays.min_inset_y, 150.0);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
