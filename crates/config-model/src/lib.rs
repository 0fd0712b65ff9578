use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

pub use gallery::GalleryConfig;
pub use hero::HeroConfig;
pub use scroll::ScrollConfig;
pub use viewer::{SectionKind, ViewerConfig};

const DEFAULT_IMAGES: [&str; 3] = ["hero1.jpg", "hero2.jpg", "hero3.jpg"];

fn ensure_images(prefix: &str, images: &[PathBuf]) -> Result<()> {
    ensure!(!images.is_empty(), "{} must list at least one image", prefix);
    for path in images {
        ensure!(
            !path.as_os_str().is_empty(),
            "{} entries must not be blank",
            prefix
        );
    }
    Ok(())
}

fn ensure_positive(name: &str, value: Option<f32>) -> Result<()> {
    if let Some(value) = value {
        ensure!(
            value.is_finite() && value > 0.0,
            "{} must be positive",
            name
        );
    }
    Ok(())
}

fn ensure_finite(name: &str, value: Option<f32>) -> Result<()> {
    if let Some(value) = value {
        ensure!(value.is_finite(), "{} must be finite", name);
    }
    Ok(())
}

mod hero {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "kebab-case", default)]
    pub struct HeroConfig {
        pub slides: Option<Vec<PathBuf>>,
        #[serde(with = "humantime_serde")]
        pub auto_advance: Option<Duration>,
        pub transition_speed: Option<f32>,
        pub commit_threshold: Option<f32>,
        pub warp_amplitude: Option<f32>,
        pub warp_frequency: Option<f32>,
        pub fallback_image_size: Option<[u32; 2]>,
    }

    impl HeroConfig {
        const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_secs(5);
        const DEFAULT_TRANSITION_SPEED: f32 = 2.0;
        const DEFAULT_COMMIT_THRESHOLD: f32 = 0.99;
        const DEFAULT_WARP_AMPLITUDE: f32 = 0.2;
        const DEFAULT_WARP_FREQUENCY: f32 = 5.0;
        const DEFAULT_FALLBACK_IMAGE_SIZE: [u32; 2] = [1920, 1080];

        pub fn slides(&self) -> Vec<PathBuf> {
            match &self.slides {
                Some(slides) => slides.clone(),
                None => DEFAULT_IMAGES.iter().map(PathBuf::from).collect(),
            }
        }

        pub fn effective_auto_advance(&self) -> Duration {
            self.auto_advance
                .filter(|interval| !interval.is_zero())
                .unwrap_or(Self::DEFAULT_AUTO_ADVANCE)
        }

        pub fn effective_transition_speed(&self) -> f32 {
            self.transition_speed
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_TRANSITION_SPEED)
        }

        pub fn effective_commit_threshold(&self) -> f32 {
            self.commit_threshold
                .filter(|value| value.is_finite() && *value > 0.0 && *value < 1.0)
                .unwrap_or(Self::DEFAULT_COMMIT_THRESHOLD)
        }

        pub fn effective_warp_amplitude(&self) -> f32 {
            self.warp_amplitude
                .filter(|value| value.is_finite())
                .unwrap_or(Self::DEFAULT_WARP_AMPLITUDE)
        }

        pub fn effective_warp_frequency(&self) -> f32 {
            self.warp_frequency
                .filter(|value| value.is_finite())
                .unwrap_or(Self::DEFAULT_WARP_FREQUENCY)
        }

        pub fn effective_fallback_image_size(&self) -> [u32; 2] {
            self.fallback_image_size
                .filter(|[w, h]| *w > 0 && *h > 0)
                .unwrap_or(Self::DEFAULT_FALLBACK_IMAGE_SIZE)
        }

        pub fn validate(&self) -> Result<()> {
            if let Some(slides) = &self.slides {
                ensure_images("hero.slides", slides)?;
            }
            if let Some(interval) = self.auto_advance {
                ensure!(!interval.is_zero(), "hero.auto-advance must be positive");
            }
            ensure_positive("hero.transition-speed", self.transition_speed)?;
            if let Some(threshold) = self.commit_threshold {
                ensure!(
                    threshold.is_finite() && threshold > 0.0 && threshold < 1.0,
                    "hero.commit-threshold must lie strictly between 0 and 1"
                );
            }
            ensure_finite("hero.warp-amplitude", self.warp_amplitude)?;
            ensure_finite("hero.warp-frequency", self.warp_frequency)?;
            if let Some([w, h]) = self.fallback_image_size {
                ensure!(
                    w > 0 && h > 0,
                    "hero.fallback-image-size must have positive width and height"
                );
            }
            Ok(())
        }
    }
}

mod gallery {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "kebab-case", default)]
    pub struct GalleryConfig {
        pub images: Option<Vec<PathBuf>>,
        pub radius: Option<f32>,
        pub wave_amplitude: Option<f32>,
        pub hover_scale: Option<f32>,
        pub aspect_stretch: Option<f32>,
        pub smoothing_rate: Option<f32>,
        pub fade_distance: Option<f32>,
        pub faded_opacity: Option<f32>,
        pub camera_position: Option<[f32; 3]>,
        pub camera_fov_degrees: Option<f32>,
        pub group_offset: Option<[f32; 3]>,
        pub initial_scale: Option<[f32; 2]>,
    }

    impl GalleryConfig {
        const DEFAULT_ITEM_COUNT: usize = 9;
        const DEFAULT_RADIUS: f32 = 4.0;
        const DEFAULT_WAVE_AMPLITUDE: f32 = 0.5;
        const DEFAULT_HOVER_SCALE: f32 = 1.2;
        const DEFAULT_ASPECT_STRETCH: f32 = 1.5;
        const DEFAULT_SMOOTHING_RATE: f32 = 5.0;
        const DEFAULT_FADE_DISTANCE: f32 = 6.0;
        const DEFAULT_FADED_OPACITY: f32 = 0.2;
        const DEFAULT_CAMERA_POSITION: [f32; 3] = [0.0, 0.0, 8.0];
        const DEFAULT_CAMERA_FOV_DEGREES: f32 = 50.0;
        const DEFAULT_GROUP_OFFSET: [f32; 3] = [0.0, -0.5, 0.0];
        const DEFAULT_INITIAL_SCALE: [f32; 2] = [1.5, 2.25];

        /// Images placed around the ring, in order. Defaults to the hero
        /// images repeated to fill nine slots.
        pub fn images(&self) -> Vec<PathBuf> {
            match &self.images {
                Some(images) => images.clone(),
                None => DEFAULT_IMAGES
                    .iter()
                    .cycle()
                    .take(Self::DEFAULT_ITEM_COUNT)
                    .map(PathBuf::from)
                    .collect(),
            }
        }

        pub fn effective_radius(&self) -> f32 {
            self.radius
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_RADIUS)
        }

        pub fn effective_wave_amplitude(&self) -> f32 {
            self.wave_amplitude
                .filter(|value| value.is_finite())
                .unwrap_or(Self::DEFAULT_WAVE_AMPLITUDE)
        }

        pub fn effective_hover_scale(&self) -> f32 {
            self.hover_scale
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_HOVER_SCALE)
        }

        pub fn effective_aspect_stretch(&self) -> f32 {
            self.aspect_stretch
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_ASPECT_STRETCH)
        }

        pub fn effective_smoothing_rate(&self) -> f32 {
            self.smoothing_rate
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_SMOOTHING_RATE)
        }

        pub fn effective_fade_distance(&self) -> f32 {
            self.fade_distance
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_FADE_DISTANCE)
        }

        pub fn effective_faded_opacity(&self) -> f32 {
            self.faded_opacity
                .filter(|value| value.is_finite())
                .unwrap_or(Self::DEFAULT_FADED_OPACITY)
                .clamp(0.0, 1.0)
        }

        pub fn effective_camera_position(&self) -> [f32; 3] {
            self.camera_position
                .filter(|pos| pos.iter().all(|v| v.is_finite()))
                .unwrap_or(Self::DEFAULT_CAMERA_POSITION)
        }

        pub fn effective_camera_fov_degrees(&self) -> f32 {
            self.camera_fov_degrees
                .filter(|value| value.is_finite() && *value > 0.0 && *value < 180.0)
                .unwrap_or(Self::DEFAULT_CAMERA_FOV_DEGREES)
        }

        pub fn effective_group_offset(&self) -> [f32; 3] {
            self.group_offset
                .filter(|pos| pos.iter().all(|v| v.is_finite()))
                .unwrap_or(Self::DEFAULT_GROUP_OFFSET)
        }

        pub fn effective_initial_scale(&self) -> [f32; 2] {
            self.initial_scale
                .filter(|s| s.iter().all(|v| v.is_finite() && *v > 0.0))
                .unwrap_or(Self::DEFAULT_INITIAL_SCALE)
        }

        pub fn validate(&self) -> Result<()> {
            if let Some(images) = &self.images {
                ensure_images("gallery.images", images)?;
            }
            ensure_positive("gallery.radius", self.radius)?;
            ensure_finite("gallery.wave-amplitude", self.wave_amplitude)?;
            ensure_positive("gallery.hover-scale", self.hover_scale)?;
            ensure_positive("gallery.aspect-stretch", self.aspect_stretch)?;
            ensure_positive("gallery.smoothing-rate", self.smoothing_rate)?;
            ensure_positive("gallery.fade-distance", self.fade_distance)?;
            if let Some(opacity) = self.faded_opacity {
                ensure!(
                    (0.0..=1.0).contains(&opacity),
                    "gallery.faded-opacity must be within [0, 1]"
                );
            }
            if let Some(fov) = self.camera_fov_degrees {
                ensure!(
                    fov.is_finite() && fov > 0.0 && fov < 180.0,
                    "gallery.camera-fov-degrees must be within (0, 180)"
                );
            }
            for (name, value) in [
                ("gallery.camera-position", self.camera_position),
                ("gallery.group-offset", self.group_offset),
            ] {
                if let Some(vec) = value {
                    ensure!(
                        vec.iter().all(|v| v.is_finite()),
                        "{} must be finite",
                        name
                    );
                }
            }
            if let Some(scale) = self.initial_scale {
                ensure!(
                    scale.iter().all(|v| v.is_finite() && *v > 0.0),
                    "gallery.initial-scale must be positive"
                );
            }
            Ok(())
        }
    }
}

mod scroll {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "kebab-case", default)]
    pub struct ScrollConfig {
        pub pages: Option<f32>,
        pub damping: Option<f32>,
        pub wheel_line_px: Option<f32>,
    }

    impl ScrollConfig {
        const DEFAULT_PAGES: f32 = 2.0;
        const DEFAULT_DAMPING: f32 = 0.2;
        const DEFAULT_WHEEL_LINE_PX: f32 = 40.0;

        pub fn effective_pages(&self) -> f32 {
            self.pages
                .filter(|value| value.is_finite() && *value >= 1.0)
                .unwrap_or(Self::DEFAULT_PAGES)
        }

        pub fn effective_damping(&self) -> f32 {
            self.damping
                .filter(|value| value.is_finite() && *value > 0.0 && *value <= 1.0)
                .unwrap_or(Self::DEFAULT_DAMPING)
        }

        pub fn effective_wheel_line_px(&self) -> f32 {
            self.wheel_line_px
                .filter(|value| value.is_finite() && *value > 0.0)
                .unwrap_or(Self::DEFAULT_WHEEL_LINE_PX)
        }

        pub fn validate(&self) -> Result<()> {
            if let Some(pages) = self.pages {
                ensure!(
                    pages.is_finite() && pages >= 1.0,
                    "scroll.pages must be at least 1"
                );
            }
            if let Some(damping) = self.damping {
                ensure!(
                    damping.is_finite() && damping > 0.0 && damping <= 1.0,
                    "scroll.damping must be within (0, 1]"
                );
            }
            ensure_positive("scroll.wheel-line-px", self.wheel_line_px)
        }
    }
}

mod viewer {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
    #[serde(rename_all = "kebab-case")]
    pub enum SectionKind {
        #[default]
        Hero,
        Gallery,
    }

    #[derive(Debug, Clone, Deserialize, Default)]
    #[serde(rename_all = "kebab-case", default)]
    pub struct ViewerConfig {
        pub title: Option<String>,
        pub fullscreen: bool,
        pub start_section: SectionKind,
    }

    impl ViewerConfig {
        pub fn title_or_default(&self) -> &str {
            match &self.title {
                Some(title) if !title.trim().is_empty() => title.as_str(),
                _ => "Showcase",
            }
        }

        pub fn validate(&self) -> Result<()> {
            if let Some(title) = &self.title {
                ensure!(
                    !title.trim().is_empty(),
                    "viewer.title must not be blank when provided"
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_defaults_match_reference_values() {
        let hero = HeroConfig::default();
        assert_eq!(hero.slides().len(), 3);
        assert_eq!(hero.effective_auto_advance(), Duration::from_secs(5));
        assert!((hero.effective_transition_speed() - 2.0).abs() < f32::EPSILON);
        assert!((hero.effective_commit_threshold() - 0.99).abs() < f32::EPSILON);
        assert_eq!(hero.effective_fallback_image_size(), [1920, 1080]);
    }

    #[test]
    fn gallery_defaults_cycle_hero_images() {
        let gallery = GalleryConfig::default();
        let images = gallery.images();
        assert_eq!(images.len(), 9);
        assert_eq!(images[0], images[3]);
        assert_eq!(images[2], PathBuf::from("hero3.jpg"));
    }

    #[test]
    fn parses_humantime_auto_advance() {
        let hero: HeroConfig = serde_yaml::from_str("auto-advance: 2500ms\n").expect("valid yaml");
        assert_eq!(hero.effective_auto_advance(), Duration::from_millis(2500));
        hero.validate().expect("valid hero config");
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        let hero: HeroConfig = serde_yaml::from_str("commit-threshold: 1.0\n").expect("valid yaml");
        assert!(hero.validate().is_err());
        assert!((hero.effective_commit_threshold() - 0.99).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_empty_gallery() {
        let gallery: GalleryConfig = serde_yaml::from_str("images: []\n").expect("valid yaml");
        assert!(gallery.validate().is_err());
    }

    #[test]
    fn scroll_damping_must_be_fractional() {
        let scroll: ScrollConfig = serde_yaml::from_str("damping: 1.5\n").expect("valid yaml");
        assert!(scroll.validate().is_err());
        assert!((scroll.effective_damping() - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn viewer_section_parses_kebab_case() {
        let viewer: ViewerConfig =
            serde_yaml::from_str("start-section: gallery\n").expect("valid yaml");
        assert_eq!(viewer.start_section, SectionKind::Gallery);
        assert_eq!(viewer.title_or_default(), "Showcase");
    }
}
