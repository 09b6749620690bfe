//! Error types shared across Boothcam crates.

/// Failure acquiring or reading the camera.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device found")]
    DeviceNotFound,

    #[error("Camera is in use by another application")]
    DeviceBusy,

    #[error("No camera mode satisfies the requested constraints: {message}")]
    UnsupportedConstraints { message: String },

    #[error("Camera stream is not ready")]
    NotReady,

    #[error("Camera error: {0}")]
    Unknown(String),
}

impl CameraError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConstraints {
            message: msg.into(),
        }
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Message shown on the blocking camera error surface.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied => "Camera access was denied. Allow camera access in your \
                                       settings and try again."
                .to_string(),
            Self::DeviceNotFound => {
                "No camera was found. Check that a camera is connected to this device.".to_string()
            }
            Self::DeviceBusy => {
                "The camera cannot be opened. Another application may be using it.".to_string()
            }
            Self::UnsupportedConstraints { .. } => {
                "This camera does not support a usable resolution.".to_string()
            }
            Self::NotReady => "Starting camera...".to_string(),
            Self::Unknown(message) => format!("Failed to start the camera: {message}"),
        }
    }

    /// Whether walking further down the fallback ladder can help.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

/// Failure producing a captured still. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Overlay asset '{asset}' has not finished loading")]
    AssetNotReady { asset: String },

    #[error("No camera frame available: {source}")]
    FrameUnavailable {
        #[source]
        source: CameraError,
    },

    #[error("Rasterization failed: {message}")]
    RasterizationFailed { message: String },

    #[error("A capture is already in progress")]
    Busy,
}

impl CaptureError {
    pub fn asset_not_ready(asset: impl Into<String>) -> Self {
        Self::AssetNotReady {
            asset: asset.into(),
        }
    }

    pub fn rasterization(msg: impl Into<String>) -> Self {
        Self::RasterizationFailed {
            message: msg.into(),
        }
    }

    /// Transient notice shown over the live preview.
    pub fn user_message(&self) -> String {
        match self {
            Self::AssetNotReady { .. } => {
                "Overlay images are still loading. Try again in a moment.".to_string()
            }
            Self::FrameUnavailable { .. } => "The camera has no picture yet.".to_string(),
            Self::RasterizationFailed { .. } => "Could not create the photo.".to_string(),
            Self::Busy => "Hold on, still taking the last photo.".to_string(),
        }
    }
}

/// Failure handing a file to the host share surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("Share cancelled by the user")]
    Cancelled,

    #[error("Share rejected by the host: {message}")]
    Rejected { message: String },

    #[error("Sharing is not available on this host")]
    Unavailable,
}

/// Top-level error type for Boothcam operations.
#[derive(Debug, thiserror::Error)]
pub enum BoothError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BoothError.
pub type BoothResult<T> = Result<T, BoothError>;

impl BoothError {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
