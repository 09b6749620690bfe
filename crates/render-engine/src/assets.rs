//! Overlay image store with asynchronous preloading.
//!
//! Every catalog asset starts `Pending`. [`AssetStore::preload`] decodes
//! them concurrently; capture refuses to run until every layer it needs is
//! `Ready`.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use boothcam_common::error::CaptureError;
use boothcam_scene_model::geometry::Size;
use boothcam_scene_model::overlay::{OverlayCatalog, OverlayLayer};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use tokio::task::JoinSet;

use crate::compositor::ResolvedLayer;

/// Load state of one overlay image.
#[derive(Debug, Clone)]
pub enum AssetState {
    Pending,
    Ready(Arc<RgbaImage>),
    Failed(String),
}

impl AssetState {
    pub fn is_ready(&self) -> bool {
        matches!(self, AssetState::Ready(_))
    }
}

/// Outcome of a preload pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreloadReport {
    pub loaded: usize,
    /// `(asset id, reason)` for every image that failed to load.
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct AssetStore {
    root: PathBuf,
    paths: HashMap<String, PathBuf>,
    states: HashMap<String, AssetState>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: HashMap::new(),
            states: HashMap::new(),
        }
    }

    /// Register every catalog asset as `Pending`, keeping any already loaded.
    pub fn register_catalog(&mut self, catalog: &OverlayCatalog) {
        for asset in catalog.all() {
            self.paths
                .insert(asset.id.clone(), self.root.join(&asset.path));
            self.states
                .entry(asset.id.clone())
                .or_insert(AssetState::Pending);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode every registered asset that is not yet `Ready`.
    pub async fn preload(&mut self) -> PreloadReport {
        self.preload_with(|path| async move { load_image(&path).await })
            .await
    }

    /// Preload with a custom loader. An asset whose task never reports back
    /// (panic or abort) ends up `Failed`, never stuck `Pending`.
    pub async fn preload_with<F, Fut>(&mut self, load: F) -> PreloadReport
    where
        F: Fn(PathBuf) -> Fut,
        Fut: Future<Output = Result<RgbaImage, String>> + Send + 'static,
    {
        let mut outstanding = HashSet::new();
        let mut tasks = JoinSet::new();
        for (id, path) in &self.paths {
            if self.states.get(id).is_some_and(AssetState::is_ready) {
                continue;
            }
            outstanding.insert(id.clone());
            let id = id.clone();
            let job = load(path.clone());
            tasks.spawn(async move { (id, job.await) });
        }
        for id in &outstanding {
            self.mark_pending(id.clone());
        }

        let mut report = PreloadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(image))) => {
                    tracing::debug!(asset = %id, w = image.width(), h = image.height(), "Overlay loaded");
                    outstanding.remove(&id);
                    self.states.insert(id, AssetState::Ready(Arc::new(image)));
                    report.loaded += 1;
                }
                Ok((id, Err(reason))) => {
                    tracing::warn!(asset = %id, %reason, "Overlay failed to load");
                    outstanding.remove(&id);
                    self.states
                        .insert(id.clone(), AssetState::Failed(reason.clone()));
                    report.failed.push((id, reason));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Overlay load task aborted");
                }
            }
        }

        for id in outstanding {
            let reason = "load task aborted".to_string();
            self.states
                .insert(id.clone(), AssetState::Failed(reason.clone()));
            report.failed.push((id, reason));
        }
        report.failed.sort();
        report
    }

    /// Store an already decoded image.
    pub fn insert(&mut self, id: impl Into<String>, image: RgbaImage) {
        self.states
            .insert(id.into(), AssetState::Ready(Arc::new(image)));
    }

    /// Mark an asset as still loading.
    pub fn mark_pending(&mut self, id: impl Into<String>) {
        self.states.insert(id.into(), AssetState::Pending);
    }

    pub fn state(&self, id: &str) -> Option<&AssetState> {
        self.states.get(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<RgbaImage>> {
        match self.states.get(id) {
            Some(AssetState::Ready(image)) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    pub fn native_size(&self, id: &str) -> Option<Size> {
        self.get(id)
            .map(|image| Size::from_u32(image.width(), image.height()))
    }

    pub fn is_ready(&self, id: &str) -> bool {
        self.states.get(id).is_some_and(AssetState::is_ready)
    }

    /// True once nothing registered is still `Pending`.
    pub fn settled(&self) -> bool {
        !self
            .states
            .values()
            .any(|s| matches!(s, AssetState::Pending))
    }

    /// Pair each layer with its image; fails on the first one not ready.
    pub fn resolve(&self, layers: &[OverlayLayer]) -> Result<Vec<ResolvedLayer>, CaptureError> {
        layers
            .iter()
            .map(|layer| {
                let image = self
                    .get(&layer.asset_id)
                    .ok_or_else(|| CaptureError::asset_not_ready(&layer.asset_id))?;
                Ok(ResolvedLayer {
                    asset_id: layer.asset_id.clone(),
                    image,
                    placement: layer.placement,
                })
            })
            .collect()
    }

    /// Like [`resolve`](Self::resolve) but silently drops layers that are
    /// not ready; used by the live preview.
    pub fn resolve_available(&self, layers: &[OverlayLayer]) -> Vec<ResolvedLayer> {
        layers
            .iter()
            .filter_map(|layer| {
                self.get(&layer.asset_id).map(|image| ResolvedLayer {
                    asset_id: layer.asset_id.clone(),
                    image,
                    placement: layer.placement,
                })
            })
            .collect()
    }
}

async fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("{}: {e}", path.display()))?;
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| format!("decode task failed: {e}"))?
        .map(|img| img.to_rgba8())
        .map_err(|e| format!("{}: {e}", path.display()))
}

/// Simple stand-in art for demos without the real image files: a rounded
/// silhouette for portraits, a banner for the fixed art.
pub fn placeholder_art(id: &str, width: u32, height: u32) -> RgbaImage {
    let width = width.max(8);
    let height = height.max(8);
    let seed = id.bytes().fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let color = Rgba([
        (seed & 0xff) as u8 | 0x40,
        ((seed >> 8) & 0xff) as u8 | 0x40,
        ((seed >> 16) & 0xff) as u8 | 0x40,
        255,
    ]);
    let mut img = RgbaImage::new(width, height);
    let (w, h) = (width as i32, height as i32);
    if width < height {
        // Head and shoulders.
        draw_filled_circle_mut(&mut img, (w / 2, h / 3), w / 4, color);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(w / 8, h / 2).of_size(width * 3 / 4, height / 2),
            color,
        );
    } else {
        draw_filled_rect_mut(
            &mut img,
            Rect::at(0, h / 4).of_size(width, height / 2),
            color,
        );
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use boothcam_scene_model::geometry::FractionalRect;
    use boothcam_scene_model::overlay::LayerPlacement;

    fn boxed(id: &str) -> OverlayLayer {
        OverlayLayer {
            asset_id: id.to_string(),
            placement: LayerPlacement::Boxed(FractionalRect::FULL),
        }
    }

    #[test]
    fn test_resolve_requires_ready() {
        let mut store = AssetStore::new("unused");
        store.insert("a", RgbaImage::new(2, 2));
        store.mark_pending("b");
        let err = store.resolve(&[boxed("a"), boxed("b")]).unwrap_err();
        assert_eq!(err, CaptureError::asset_not_ready("b"));
        assert_eq!(store.resolve_available(&[boxed("a"), boxed("b")]).len(), 1);
        assert!(!store.settled());
    }

    #[tokio::test]
    async fn test_preload_reports_missing_files() {
        let dir = std::env::temp_dir().join("boothcam_test_assets");
        std::fs::create_dir_all(dir.join("images/member")).unwrap();
        placeholder_art("live_logo", 40, 20)
            .save(dir.join("images/live_logo.png"))
            .unwrap();

        let mut store = AssetStore::new(&dir);
        store.register_catalog(&OverlayCatalog::default());
        assert!(!store.is_ready("live_logo"));

        let report = store.preload().await;
        assert_eq!(report.loaded, 1);
        assert_eq!(report.failed.len(), 8);
        assert!(store.is_ready("live_logo"));
        assert_eq!(store.native_size("live_logo"), Some(Size::new(40.0, 20.0)));
        assert!(matches!(store.state("maya"), Some(AssetState::Failed(_))));
        assert!(store.settled());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_panicking_load_is_marked_failed() {
        let mut store = AssetStore::new("unused");
        store.register_catalog(&OverlayCatalog::default());

        let report = store
            .preload_with(|path| async move {
                if path.ends_with("live_logo.png") {
                    panic!("decoder crashed");
                }
                Ok(RgbaImage::new(4, 4))
            })
            .await;

        assert_eq!(report.loaded, 8);
        assert_eq!(
            report.failed,
            vec![("live_logo".to_string(), "load task aborted".to_string())]
        );
        assert!(matches!(store.state("live_logo"), Some(AssetState::Failed(_))));
        assert!(store.settled());
    }

    #[test]
    fn test_placeholder_shapes() {
        let portrait = placeholder_art("maya", 60, 100);
        assert_eq!(portrait.get_pixel(0, 0)[3], 0);
        assert_eq!(portrait.get_pixel(30, 33)[3], 255);
        let banner = placeholder_art("live_logo", 100, 40);
        assert_eq!(banner.get_pixel(50, 20)[3], 255);
    }
}
