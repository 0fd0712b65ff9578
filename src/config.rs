use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

pub use config_model::{GalleryConfig, HeroConfig, ScrollConfig, SectionKind, ViewerConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Base directory relative image paths are resolved against.
    pub asset_root: PathBuf,
    /// Maximum number of concurrent image decodes in the loader.
    pub loader_max_concurrent_decodes: usize,
    /// Decoded images larger than this on either side are downscaled.
    pub max_texture_dimension: u32,
    /// Crossfading hero slideshow.
    pub hero: HeroConfig,
    /// Circular scroll gallery.
    pub gallery: GalleryConfig,
    /// Virtual scroll region driving the gallery rotation.
    pub scroll: ScrollConfig,
    pub viewer: ViewerConfig,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.loader_max_concurrent_decodes > 0,
            "loader-max-concurrent-decodes must be greater than zero"
        );
        ensure!(
            self.max_texture_dimension > 0,
            "max-texture-dimension must be greater than zero"
        );
        self.hero.validate().context("invalid hero configuration")?;
        self.gallery
            .validate()
            .context("invalid gallery configuration")?;
        self.scroll
            .validate()
            .context("invalid scroll configuration")?;
        self.viewer
            .validate()
            .context("invalid viewer configuration")?;
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("public"),
            loader_max_concurrent_decodes: 4,
            max_texture_dimension: 4096,
            hero: HeroConfig::default(),
            gallery: GalleryConfig::default(),
            scroll: ScrollConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}
