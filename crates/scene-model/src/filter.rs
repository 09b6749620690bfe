//! User-adjustable filter settings.

use serde::{Deserialize, Serialize};

/// Largest accepted brightness/contrast percentage.
pub const MAX_ADJUST_PCT: u16 = 200;

/// Stylistic filter applied after brightness and contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    None,
    Grayscale,
    Sepia,
    Blur,
}

impl FilterKind {
    pub fn all() -> &'static [FilterKind] {
        &[
            FilterKind::None,
            FilterKind::Grayscale,
            FilterKind::Sepia,
            FilterKind::Blur,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Blur => "blur",
        }
    }
}

impl std::str::FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Unknown filter: {s}. Use: none, grayscale, sepia, blur"))
    }
}

/// Brightness, contrast, and a named filter. 100% is identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSettings {
    pub kind: FilterKind,
    brightness_pct: u16,
    contrast_pct: u16,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            kind: FilterKind::None,
            brightness_pct: 100,
            contrast_pct: 100,
        }
    }
}

impl FilterSettings {
    /// Build settings, clamping percentages to `[0, 200]`.
    pub fn new(kind: FilterKind, brightness_pct: u16, contrast_pct: u16) -> Self {
        Self {
            kind,
            brightness_pct: brightness_pct.min(MAX_ADJUST_PCT),
            contrast_pct: contrast_pct.min(MAX_ADJUST_PCT),
        }
    }

    pub fn brightness_pct(&self) -> u16 {
        self.brightness_pct
    }

    pub fn contrast_pct(&self) -> u16 {
        self.contrast_pct
    }

    pub fn set_brightness(&mut self, pct: u16) {
        self.brightness_pct = pct.min(MAX_ADJUST_PCT);
    }

    pub fn set_contrast(&mut self, pct: u16) {
        self.contrast_pct = pct.min(MAX_ADJUST_PCT);
    }

    /// True when applying these settings leaves a frame unchanged.
    pub fn is_identity(&self) -> bool {
        self.kind == FilterKind::None && self.brightness_pct == 100 && self.contrast_pct == 100
    }

    /// CSS-equivalent filter string, handy for logs and host previews.
    pub fn css(&self) -> String {
        let mut css = format!(
            "brightness({}%) contrast({}%)",
            self.brightness_pct, self.contrast_pct
        );
        match self.kind {
            FilterKind::Grayscale => css.push_str(" grayscale(100%)"),
            FilterKind::Sepia => css.push_str(" sepia(100%)"),
            FilterKind::Blur => css.push_str(" blur(5px)"),
            FilterKind::None => {}
        }
        css
    }
}
