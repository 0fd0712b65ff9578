use rust_showcase::config::{Configuration, SectionKind};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn empty_document_uses_reference_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.asset_root, PathBuf::from("public"));
    assert_eq!(cfg.loader_max_concurrent_decodes, 4);
    assert_eq!(cfg.max_texture_dimension, 4096);
    assert_eq!(cfg.hero.slides().len(), 3);
    assert_eq!(cfg.hero.effective_auto_advance(), Duration::from_secs(5));
    assert_eq!(cfg.gallery.images().len(), 9);
    assert!((cfg.scroll.effective_pages() - 2.0).abs() < f32::EPSILON);
    assert!((cfg.scroll.effective_damping() - 0.2).abs() < f32::EPSILON);
    assert_eq!(cfg.viewer.start_section, SectionKind::Hero);
    assert_eq!(cfg.viewer.title_or_default(), "Showcase");
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
asset-root: "/srv/showcase"
loader-max-concurrent-decodes: 2
hero:
  slides: [a.jpg, b.jpg]
  auto-advance: 3s
  transition-speed: 4.0
gallery:
  images: [a.jpg, b.jpg, c.jpg, d.jpg]
  radius: 6.0
  camera-position: [0.0, 1.0, 10.0]
scroll:
  pages: 3.0
  damping: 0.5
viewer:
  title: "Portfolio"
  fullscreen: true
  start-section: gallery
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.asset_root, PathBuf::from("/srv/showcase"));
    assert_eq!(cfg.loader_max_concurrent_decodes, 2);
    assert_eq!(
        cfg.hero.slides(),
        vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]
    );
    assert_eq!(cfg.hero.effective_auto_advance(), Duration::from_secs(3));
    assert!((cfg.hero.effective_transition_speed() - 4.0).abs() < f32::EPSILON);
    assert_eq!(cfg.gallery.images().len(), 4);
    assert!((cfg.gallery.effective_radius() - 6.0).abs() < f32::EPSILON);
    assert_eq!(cfg.gallery.effective_camera_position(), [0.0, 1.0, 10.0]);
    assert!((cfg.scroll.effective_pages() - 3.0).abs() < f32::EPSILON);
    assert!(cfg.viewer.fullscreen);
    assert_eq!(cfg.viewer.start_section, SectionKind::Gallery);
    assert_eq!(cfg.viewer.title_or_default(), "Portfolio");
}

#[test]
fn unknown_top_level_keys_are_rejected() {
    let err = serde_yaml::from_str::<Configuration>("photo-library-path: /photos\n").unwrap_err();
    assert!(err.to_string().contains("unknown field"));
}

#[test]
fn rejects_zero_concurrency() {
    let cfg: Configuration = serde_yaml::from_str("loader-max-concurrent-decodes: 0\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("loader-max-concurrent-decodes"));
}

#[test]
fn rejects_empty_slide_list() {
    let cfg: Configuration = serde_yaml::from_str("hero:\n  slides: []\n").unwrap();
    let err = cfg.validated().unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("invalid hero configuration"));
    assert!(message.contains("hero.slides"));
}

#[test]
fn rejects_out_of_range_damping() {
    let cfg: Configuration = serde_yaml::from_str("scroll:\n  damping: 1.5\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("scroll.damping"));
}

#[test]
fn rejects_faded_opacity_outside_unit_range() {
    let cfg: Configuration = serde_yaml::from_str("gallery:\n  faded-opacity: 2.0\n").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn loads_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("showcase.yaml");
    std::fs::write(&path, "hero:\n  commit-threshold: 0.95\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap().validated().unwrap();
    assert!((cfg.hero.effective_commit_threshold() - 0.95).abs() < f32::EPSILON);
}
