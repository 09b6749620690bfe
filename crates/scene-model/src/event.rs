//! UI event types that drive the booth state.
//!
//! A host (browser shell, desktop window, or a scripted run) feeds these
//! events in order. Scripts are stored as JSONL, one event per line.
//! Pointer coordinates are in container pixels, origin top-left.

use serde::{Deserialize, Serialize};

use crate::filter::FilterKind;

/// Milliseconds since the script started.
pub type TimestampMs = u64;

/// What produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// A single UI event with timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    #[serde(rename = "t", default)]
    pub timestamp_ms: TimestampMs,

    #[serde(flatten)]
    pub event: UiEvent,
}

/// Discriminated union of UI events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Tap on a member thumbnail. Tapping the selected member deselects it.
    SelectMember { id: String },

    /// Remove the member overlay.
    ClearMember,

    /// Choose the stylistic filter.
    SetFilter { kind: FilterKind },

    /// Brightness slider, percent.
    SetBrightness { pct: u16 },

    /// Contrast slider, percent.
    SetContrast { pct: u16 },

    /// Show or hide the fixed live art.
    SetFixedArt { visible: bool },

    /// Mouse down / touch start.
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        source: PointerSource,
    },

    /// Mouse move / touch move.
    PointerMove { x: f64, y: f64 },

    /// Mouse up / touch end.
    PointerUp,

    /// Pointer left the overlay element.
    PointerLeave,

    /// Preview container resized (CSS px).
    Resize { width: f64, height: f64 },

    /// Shutter button.
    Shutter,

    /// Discard the captured image and return to the live preview.
    Retake,
}

impl TimedEvent {
    pub fn new(timestamp_ms: TimestampMs, event: UiEvent) -> Self {
        Self {
            timestamp_ms,
            event,
        }
    }
}

impl UiEvent {
    /// Session-level commands that the booth state does not handle itself.
    pub fn is_command(&self) -> bool {
        matches!(self, UiEvent::Shutter | UiEvent::Retake)
    }
}

/// Parse events from JSONL content (one JSON object per line).
pub fn parse_events(jsonl: &str) -> Result<Vec<TimedEvent>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
