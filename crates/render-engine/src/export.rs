//! Export sink: download to disk and hand off to a share target.

use std::path::{Path, PathBuf};

use boothcam_common::clock::file_timestamp;
use boothcam_common::error::{BoothError, BoothResult, ShareError};
use chrono::{DateTime, Utc};

use crate::capture::CapturedImage;

/// A file offered to a share target.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFile {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Host share surface (system share sheet, messaging hand-off, ...).
#[async_trait::async_trait]
pub trait ShareTarget: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the host can share this file at all.
    fn can_share(&self, file: &SharedFile) -> bool;

    async fn share(&self, file: SharedFile) -> Result<(), ShareError>;
}

/// Host without any share surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShare;

#[async_trait::async_trait]
impl ShareTarget for NoShare {
    fn name(&self) -> &str {
        "none"
    }

    fn can_share(&self, _file: &SharedFile) -> bool {
        false
    }

    async fn share(&self, _file: SharedFile) -> Result<(), ShareError> {
        Err(ShareError::Unavailable)
    }
}

/// Writes the file to a staging directory and opens it with the desktop's
/// default handler.
#[derive(Debug, Clone)]
pub struct SystemShare {
    staging_dir: PathBuf,
}

impl SystemShare {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("boothcam-share"))
    }
}

#[async_trait::async_trait]
impl ShareTarget for SystemShare {
    fn name(&self) -> &str {
        "system"
    }

    fn can_share(&self, file: &SharedFile) -> bool {
        file.mime_type.starts_with("image/")
    }

    async fn share(&self, file: SharedFile) -> Result<(), ShareError> {
        let rejected = |e: std::io::Error| ShareError::Rejected {
            message: e.to_string(),
        };
        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(rejected)?;
        let path = self.staging_dir.join(&file.name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(rejected)?;
        tracing::info!(path = %path.display(), "Opening shared photo");
        open::that_detached(&path).map_err(rejected)
    }
}

/// Result of a share attempt. Share failures never propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Cancelled,
    Unavailable,
    Failed(String),
}

/// Delivers captured stills to the user.
pub struct ExportSink {
    output_dir: PathBuf,
    file_prefix: String,
    share_target: Box<dyn ShareTarget>,
}

impl ExportSink {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        file_prefix: impl Into<String>,
        share_target: Box<dyn ShareTarget>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
            share_target,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn share_target_name(&self) -> &str {
        self.share_target.name()
    }

    /// `<prefix>-<timestamp>.<ext>`.
    pub fn download_name(&self, image: &CapturedImage, at: DateTime<Utc>) -> String {
        format!(
            "{}-{}.{}",
            self.file_prefix,
            file_timestamp(at),
            image.format().extension()
        )
    }

    /// Save under a timestamped name in the output directory.
    pub async fn download(&self, image: &CapturedImage) -> BoothResult<PathBuf> {
        self.download_at(image, Utc::now()).await
    }

    /// Like [`download`](Self::download) with an explicit timestamp. An
    /// existing file is never overwritten; a numeric suffix is added instead.
    pub async fn download_at(
        &self,
        image: &CapturedImage,
        at: DateTime<Utc>,
    ) -> BoothResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let name = self.download_name(image, at);
        let path = unique_path(&self.output_dir.join(name)).await;
        tokio::fs::write(&path, image.bytes())
            .await
            .map_err(|e| BoothError::export(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), bytes = image.bytes().len(), "Photo downloaded");
        Ok(path)
    }

    /// File handed to the share target: a fixed name with no timestamp.
    pub fn shared_file(&self, image: &CapturedImage) -> SharedFile {
        SharedFile {
            name: format!("{}.{}", self.file_prefix, image.format().extension()),
            mime_type: image.mime_type(),
            bytes: image.bytes().to_vec(),
        }
    }

    /// Whether the share control should be shown for this image.
    pub fn share_offered(&self, image: &CapturedImage) -> bool {
        self.share_target.can_share(&self.shared_file(image))
    }

    /// Share the image. Errors, including user cancellation, are logged
    /// and reported as an outcome, never raised.
    pub async fn share(&self, image: &CapturedImage) -> ShareOutcome {
        let file = self.shared_file(image);
        if !self.share_target.can_share(&file) {
            return ShareOutcome::Unavailable;
        }
        match self.share_target.share(file).await {
            Ok(()) => ShareOutcome::Shared,
            Err(ShareError::Cancelled) => {
                tracing::debug!("Share cancelled");
                ShareOutcome::Cancelled
            }
            Err(ShareError::Unavailable) => ShareOutcome::Unavailable,
            Err(e) => {
                tracing::warn!(share_target = self.share_target.name(), error = %e, "Share failed");
                ShareOutcome::Failed(e.to_string())
            }
        }
    }
}

async fn unique_path(path: &Path) -> PathBuf {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 1u32;
    loop {
        let candidate = path.with_file_name(format!("{stem}-{n}.{ext}"));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boothcam_common::config::OutputFormat;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct RecordingShare {
        result: Result<(), ShareError>,
        seen: Mutex<Vec<SharedFile>>,
    }

    #[async_trait::async_trait]
    impl ShareTarget for RecordingShare {
        fn name(&self) -> &str {
            "recording"
        }

        fn can_share(&self, _file: &SharedFile) -> bool {
            true
        }

        async fn share(&self, file: SharedFile) -> Result<(), ShareError> {
            self.seen.lock().unwrap().push(file);
            self.result.clone()
        }
    }

    fn jpeg() -> CapturedImage {
        CapturedImage::new(vec![0xFF, 0xD8, 0xFF], OutputFormat::Jpeg, 1, 1)
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 15).unwrap()
    }

    #[test]
    fn test_download_name() {
        let sink = ExportSink::new("/tmp", "xg-camera", Box::new(NoShare));
        assert_eq!(
            sink.download_name(&jpeg(), at()),
            "xg-camera-20261018T093015.000Z.jpg"
        );
    }

    #[tokio::test]
    async fn test_download_never_overwrites() {
        let dir = std::env::temp_dir().join("boothcam_test_download");
        let _ = std::fs::remove_dir_all(&dir);
        let sink = ExportSink::new(&dir, "xg-camera", Box::new(NoShare));

        let first = sink.download_at(&jpeg(), at()).await.unwrap();
        let second = sink.download_at(&jpeg(), at()).await.unwrap();
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with(".000Z-1.jpg"));
        assert_eq!(std::fs::read(&first).unwrap(), jpeg().bytes());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_no_share_is_not_offered() {
        let sink = ExportSink::new("/tmp", "xg-camera", Box::new(NoShare));
        assert!(!sink.share_offered(&jpeg()));
        assert_eq!(sink.share(&jpeg()).await, ShareOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_share_uses_fixed_name() {
        let target = RecordingShare {
            result: Ok(()),
            seen: Mutex::new(Vec::new()),
        };
        let sink = ExportSink::new("/tmp", "xg-camera", Box::new(target));
        assert!(sink.share_offered(&jpeg()));
        assert_eq!(sink.share(&jpeg()).await, ShareOutcome::Shared);
        assert_eq!(sink.shared_file(&jpeg()).name, "xg-camera.jpg");
        assert_eq!(sink.shared_file(&jpeg()).mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_share_errors_are_swallowed() {
        let cancelled = ExportSink::new(
            "/tmp",
            "xg-camera",
            Box::new(RecordingShare {
                result: Err(ShareError::Cancelled),
                seen: Mutex::new(Vec::new()),
            }),
        );
        assert_eq!(cancelled.share(&jpeg()).await, ShareOutcome::Cancelled);

        let rejected = ExportSink::new(
            "/tmp",
            "xg-camera",
            Box::new(RecordingShare {
                result: Err(ShareError::Rejected {
                    message: "host said no".to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }),
        );
        assert!(matches!(
            rejected.share(&jpeg()).await,
            ShareOutcome::Failed(msg) if msg.contains("host said no")
        ));
    }
}
