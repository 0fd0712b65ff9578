//! Image catalog shared by the hero and the gallery.
//!
//! Slides and gallery items hold `AssetId`s only; the catalog decides which
//! paths get decoded (each distinct path once) and remembers what the
//! texture provider reported for it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::UVec2;

use crate::events::LoadTexture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    Pending,
    Ready { width: u32, height: u32 },
    Failed,
}

#[derive(Debug, Clone)]
struct Asset {
    path: PathBuf,
    state: AssetState,
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    root: PathBuf,
    assets: Vec<Asset>,
    by_path: HashMap<PathBuf, AssetId>,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Resolve `path` against the catalog root and return its id, registering
    /// it on first sight.
    pub fn intern(&mut self, path: impl AsRef<Path>) -> AssetId {
        let resolved = self.root.join(path.as_ref());
        if let Some(id) = self.by_path.get(&resolved) {
            return *id;
        }
        let id = AssetId(self.assets.len());
        self.by_path.insert(resolved.clone(), id);
        self.assets.push(Asset {
            path: resolved,
            state: AssetState::Pending,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn path(&self, id: AssetId) -> Option<&Path> {
        self.assets.get(id.0).map(|asset| asset.path.as_path())
    }

    pub fn state(&self, id: AssetId) -> Option<AssetState> {
        self.assets.get(id.0).map(|asset| asset.state)
    }

    /// Native pixel size once the texture provider resolved the asset.
    pub fn resolution(&self, id: AssetId) -> Option<UVec2> {
        match self.state(id)? {
            AssetState::Ready { width, height } if width > 0 && height > 0 => {
                Some(UVec2::new(width, height))
            }
            _ => None,
        }
    }

    pub fn mark_ready(&mut self, id: AssetId, width: u32, height: u32) {
        if let Some(asset) = self.assets.get_mut(id.0) {
            asset.state = AssetState::Ready { width, height };
        }
    }

    /// A failed asset stays failed; an earlier successful load is kept.
    pub fn mark_failed(&mut self, id: AssetId) {
        if let Some(asset) = self.assets.get_mut(id.0) {
            if asset.state == AssetState::Pending {
                asset.state = AssetState::Failed;
            }
        }
    }

    pub fn load_requests(&self) -> Vec<LoadTexture> {
        self.assets
            .iter()
            .enumerate()
            .map(|(idx, asset)| LoadTexture {
                id: AssetId(idx),
                path: asset.path.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates_paths() {
        let mut catalog = AssetCatalog::new("/assets");
        let a = catalog.intern("hero1.jpg");
        let b = catalog.intern("hero2.jpg");
        let again = catalog.intern("hero1.jpg");
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.path(b), Some(Path::new("/assets/hero2.jpg")));
    }

    #[test]
    fn resolution_only_after_ready() {
        let mut catalog = AssetCatalog::new("");
        let id = catalog.intern("a.png");
        assert_eq!(catalog.resolution(id), None);
        catalog.mark_ready(id, 640, 480);
        assert_eq!(catalog.resolution(id), Some(UVec2::new(640, 480)));
    }

    #[test]
    fn failure_does_not_discard_resolved_asset() {
        let mut catalog = AssetCatalog::new("");
        let ok = catalog.intern("ok.png");
        let bad = catalog.intern("bad.png");
        catalog.mark_ready(ok, 10, 10);
        catalog.mark_failed(ok);
        catalog.mark_failed(bad);
        assert_eq!(catalog.state(ok), Some(AssetState::Ready { width: 10, height: 10 }));
        assert_eq!(catalog.state(bad), Some(AssetState::Failed));
        assert_eq!(catalog.load_requests().len(), 2);
    }
}
