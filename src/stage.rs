//! Per-frame driver for both sections.
//!
//! One `Stage::tick` runs the hero transition, then the scroll mapper, then
//! every gallery item, so items always read the offset computed this frame.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::assets::AssetCatalog;
use crate::config::Configuration;
use crate::events::{TextureEvent, ViewerCommand};
use crate::gallery::GalleryController;
use crate::hero::HeroController;
use crate::hero::transition::TransitionCommit;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the previous frame; `0.0` on the first frame.
    pub delta: f32,
    /// Seconds since the first frame.
    pub elapsed: f32,
}

/// Wall-clock frame timer.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    started: Option<Instant>,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn tick(&mut self, now: Instant) -> FrameTick {
        let started = *self.started.get_or_insert(now);
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        FrameTick {
            delta,
            elapsed: now.saturating_duration_since(started).as_secs_f32(),
        }
    }
}

pub struct Stage {
    catalog: AssetCatalog,
    hero: HeroController,
    gallery: GalleryController,
    elapsed: f32,
}

impl Stage {
    pub fn from_config(cfg: &Configuration) -> Self {
        let mut catalog = AssetCatalog::new(&cfg.asset_root);
        let hero = HeroController::from_config(&cfg.hero, &mut catalog);
        let gallery = GalleryController::from_config(&cfg.gallery, &cfg.scroll, &mut catalog);
        Self {
            catalog,
            hero,
            gallery,
            elapsed: 0.0,
        }
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn hero(&self) -> &HeroController {
        &self.hero
    }

    pub fn hero_mut(&mut self) -> &mut HeroController {
        &mut self.hero
    }

    pub fn gallery(&self) -> &GalleryController {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut GalleryController {
        &mut self.gallery
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Apply a slide command. Section toggles belong to the viewer and are
    /// ignored here.
    pub fn apply_command(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::SelectSlide(index) => {
                if let Err(err) = self.hero.select_slide(index) {
                    warn!(error = %err, "ignoring slide selection");
                }
            }
            ViewerCommand::AdvanceSlide => self.hero.advance(),
            ViewerCommand::ToggleSection => {}
        }
    }

    /// Record a loader outcome in the catalog.
    pub fn apply_texture_event(&mut self, event: &TextureEvent) {
        match event {
            TextureEvent::Loaded(texture) => {
                debug!(
                    path = %texture.path.display(),
                    width = texture.width,
                    height = texture.height,
                    "texture ready"
                );
                self.catalog
                    .mark_ready(texture.id, texture.width, texture.height);
            }
            TextureEvent::Failed { id, path, reason } => {
                warn!(path = %path.display(), reason = %reason, "texture failed; using fallback");
                self.catalog.mark_failed(*id);
            }
        }
    }

    pub fn tick(&mut self, delta: f32) -> Option<TransitionCommit> {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.elapsed += delta;
        let commit = self.hero.tick(delta);
        if let Some(commit) = commit {
            info!(slide = commit.to, from = commit.from, "slide committed");
        }
        self.gallery.tick_scroll(delta);
        self.gallery.tick_items(delta);
        commit
    }
}

/// A commit observed during a headless run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineCommit {
    pub at: f32,
    pub commit: TransitionCommit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineItem {
    pub index: usize,
    pub angle: f32,
    pub position: [f32; 3],
    pub opacity: f32,
    pub grayscale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineReport {
    pub seconds: f32,
    pub fps: f32,
    pub frames: usize,
    pub commits: Vec<TimelineCommit>,
    pub active_index: usize,
    pub damped_scroll: f32,
    pub items: Vec<TimelineItem>,
}

const MIN_TIMELINE_FPS: f32 = 1.0;
const MAX_TIMELINE_FPS: f32 = 1000.0;
const DEFAULT_TIMELINE_FPS: f32 = 60.0;
const MAX_TIMELINE_SECONDS: f32 = 3600.0;

/// Run the stage headless for `seconds` at a fixed `fps`, advancing the hero
/// on the configured auto-advance schedule (first advance one interval in).
/// `fps` is clamped to `1..=1000` and `seconds` to at most one hour; the
/// report carries the values actually simulated.
pub fn simulate_timeline(
    cfg: &Configuration,
    seconds: f32,
    fps: f32,
    scroll_offset: Option<f32>,
) -> TimelineReport {
    let mut stage = Stage::from_config(cfg);
    if let Some(offset) = scroll_offset {
        stage.gallery_mut().set_scroll_offset(offset);
    }

    let fps = if fps.is_finite() {
        fps.clamp(MIN_TIMELINE_FPS, MAX_TIMELINE_FPS)
    } else {
        DEFAULT_TIMELINE_FPS
    };
    let seconds = if seconds.is_finite() {
        seconds.clamp(0.0, MAX_TIMELINE_SECONDS)
    } else {
        0.0
    };
    let frame = Duration::from_secs_f32(1.0 / fps);
    let interval = cfg.hero.effective_auto_advance();
    let frames = (seconds * fps).round() as usize;

    let mut now = Duration::ZERO;
    let mut next_advance = interval;
    let mut commits = Vec::new();
    for index in 0..=frames {
        let delta = if index == 0 { 0.0 } else { frame.as_secs_f32() };
        if index > 0 {
            now += frame;
        }
        while now >= next_advance {
            stage.apply_command(ViewerCommand::AdvanceSlide);
            next_advance += interval;
        }
        if let Some(commit) = stage.tick(delta) {
            commits.push(TimelineCommit {
                at: stage.elapsed(),
                commit,
            });
        }
    }

    let items = stage
        .gallery()
        .items()
        .iter()
        .map(|item| TimelineItem {
            index: item.index(),
            angle: item.angle(),
            position: item.position().to_array(),
            opacity: item.opacity(),
            grayscale: item.grayscale(),
        })
        .collect();

    TimelineReport {
        seconds,
        fps,
        frames: frames + 1,
        commits,
        active_index: stage.hero().active_index(),
        damped_scroll: stage.gallery().scroll().damped(),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_clamps_degenerate_frame_rates() {
        let cfg = Configuration::default();
        let slow = simulate_timeline(&cfg, 1.0, 1e-20, None);
        assert_eq!(slow.fps, 1.0);
        assert_eq!(slow.frames, 2);

        let fast = simulate_timeline(&cfg, 0.01, 1e9, None);
        assert_eq!(fast.fps, 1000.0);
        assert_eq!(fast.frames, 11);

        let invalid = simulate_timeline(&cfg, f32::NAN, f32::INFINITY, None);
        assert_eq!((invalid.seconds, invalid.fps, invalid.frames), (0.0, 60.0, 1));
    }

    #[test]
    fn first_frame_has_zero_delta() {
        let mut clock = FrameClock::default();
        let t0 = Instant::now();
        assert_eq!(clock.tick(t0).delta, 0.0);
        let tick = clock.tick(t0 + Duration::from_millis(16));
        assert!((tick.delta - 0.016).abs() < 1e-6);
        assert!((tick.elapsed - 0.016).abs() < 1e-6);
    }

    #[test]
    fn selection_commits_after_enough_ticks() {
        let mut stage = Stage::from_config(&Configuration::default());
        stage.apply_command(ViewerCommand::SelectSlide(1));
        let mut commit = None;
        for _ in 0..600 {
            if let Some(c) = stage.tick(1.0 / 60.0) {
                commit = Some(c);
                break;
            }
        }
        assert_eq!(commit, Some(TransitionCommit { from: 0, to: 1 }));
        assert_eq!(stage.hero().transition().progress(), 0.0);
    }

    #[test]
    fn invalid_selection_is_ignored() {
        let mut stage = Stage::from_config(&Configuration::default());
        stage.apply_command(ViewerCommand::SelectSlide(99));
        assert_eq!(stage.hero().requested_index(), 0);
        assert!(stage.tick(0.5).is_none());
    }

    #[test]
    fn timeline_advances_on_schedule() {
        let report = simulate_timeline(&Configuration::default(), 13.0, 60.0, None);
        assert_eq!(report.commits.len(), 2);
        assert_eq!(report.commits[0].commit, TransitionCommit { from: 0, to: 1 });
        assert_eq!(report.commits[1].commit, TransitionCommit { from: 1, to: 2 });
        assert!(report.commits[0].at > 5.0 && report.commits[0].at < 8.0);
        assert_eq!(report.active_index, 2);
    }

    #[test]
    fn timeline_applies_scroll() {
        let report = simulate_timeline(&Configuration::default(), 2.0, 60.0, Some(0.5));
        assert!((report.damped_scroll - 0.5).abs() < 1e-3);
        assert_eq!(report.items.len(), 9);
    }
}
