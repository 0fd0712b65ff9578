pub mod crossfade;
pub mod transition;

use config_model::HeroConfig;
use glam::UVec2;

use crate::assets::{AssetCatalog, AssetId};
use crate::error::ShowcaseError;
use crossfade::{CrossfadeUniforms, Warp};
use transition::{TransitionCommit, TransitionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub index: usize,
    pub texture: AssetId,
}

/// The two ways a slide gets requested: explicit selection and auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideRequest {
    Select(usize),
    Advance,
}

/// Everything the crossfade pipeline needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroFrame {
    pub from: AssetId,
    pub to: AssetId,
    pub uniforms: CrossfadeUniforms,
}

/// Owns the slide list, the requested index and the transition state.
#[derive(Debug, Clone)]
pub struct HeroController {
    slides: Vec<Slide>,
    requested: usize,
    transition: TransitionState,
    warp: Warp,
    fallback_image: UVec2,
}

impl HeroController {
    pub fn new(slides: Vec<Slide>, cfg: &HeroConfig) -> Self {
        let [w, h] = cfg.effective_fallback_image_size();
        Self {
            slides,
            requested: 0,
            transition: TransitionState::new(
                0,
                cfg.effective_transition_speed(),
                cfg.effective_commit_threshold(),
            ),
            warp: Warp {
                amplitude: cfg.effective_warp_amplitude(),
                frequency: cfg.effective_warp_frequency(),
            },
            fallback_image: UVec2::new(w, h),
        }
    }

    pub fn from_config(cfg: &HeroConfig, catalog: &mut AssetCatalog) -> Self {
        let slides = cfg
            .slides()
            .iter()
            .enumerate()
            .map(|(index, path)| Slide {
                index,
                texture: catalog.intern(path),
            })
            .collect();
        Self::new(slides, cfg)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn requested_index(&self) -> usize {
        self.requested
    }

    /// Slide currently shown or being faded to; drives indicator UI.
    pub fn active_index(&self) -> usize {
        self.transition.active_index()
    }

    pub fn transition(&self) -> &TransitionState {
        &self.transition
    }

    /// Single writer of the requested slide index. Read by the next tick.
    pub fn request(&mut self, request: SlideRequest) -> Result<usize, ShowcaseError> {
        let len = self.slides.len();
        let next = match request {
            SlideRequest::Select(index) if index < len => index,
            SlideRequest::Select(index) => {
                return Err(ShowcaseError::SlideOutOfRange { index, len });
            }
            SlideRequest::Advance if len == 0 => return Ok(self.requested),
            SlideRequest::Advance => (self.requested + 1) % len,
        };
        self.requested = next;
        Ok(next)
    }

    pub fn select_slide(&mut self, index: usize) -> Result<(), ShowcaseError> {
        self.request(SlideRequest::Select(index)).map(|_| ())
    }

    pub fn advance(&mut self) {
        let _ = self.request(SlideRequest::Advance);
    }

    pub fn tick(&mut self, delta: f32) -> Option<TransitionCommit> {
        self.transition.observe_request(self.requested);
        self.transition.tick(delta)
    }

    /// Shader inputs for this frame. `None` when there are no slides.
    pub fn frame(&self, elapsed: f32, surface: UVec2, catalog: &AssetCatalog) -> Option<HeroFrame> {
        let inputs = self.transition.shader_inputs();
        let from = self.slides.get(inputs.from)?.texture;
        let to = self.slides.get(inputs.to)?.texture;
        let uniforms = CrossfadeUniforms::new(
            inputs.progress,
            elapsed,
            self.warp,
            surface.as_vec2(),
            catalog.resolution(from).map(|size| size.as_vec2()),
            catalog.resolution(to).map(|size| size.as_vec2()),
            self.fallback_image.as_vec2(),
        );
        Some(HeroFrame { from, to, uniforms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn controller() -> (HeroController, AssetCatalog) {
        let mut catalog = AssetCatalog::new("");
        let hero = HeroController::from_config(&HeroConfig::default(), &mut catalog);
        (hero, catalog)
    }

    #[test]
    fn advance_wraps_modulo_slide_count() {
        let (mut hero, _) = controller();
        hero.advance();
        hero.advance();
        assert_eq!(hero.requested_index(), 2);
        hero.advance();
        assert_eq!(hero.requested_index(), 0);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let (mut hero, _) = controller();
        let err = hero.select_slide(7).unwrap_err();
        assert!(matches!(err, ShowcaseError::SlideOutOfRange { index: 7, len: 3 }));
        assert_eq!(hero.requested_index(), 0);
    }

    #[test]
    fn advance_continues_from_manual_selection() {
        let (mut hero, _) = controller();
        hero.select_slide(2).unwrap();
        hero.advance();
        assert_eq!(hero.requested_index(), 0);
    }

    #[test]
    fn frame_falls_back_until_texture_resolves() {
        let (mut hero, mut catalog) = controller();
        let frame = hero.frame(0.0, UVec2::new(800, 600), &catalog).unwrap();
        assert_eq!(frame.uniforms.image_resolution_a, [1920.0, 1080.0]);
        assert_eq!(frame.uniforms.image_resolution_b, [1920.0, 1080.0]);
        assert_eq!(frame.from, frame.to);

        catalog.mark_ready(hero.slides()[1].texture, 1000, 500);
        hero.select_slide(1).unwrap();
        hero.tick(0.1);
        let frame = hero.frame(0.1, UVec2::new(800, 600), &catalog).unwrap();
        assert_eq!(frame.from, hero.slides()[0].texture);
        assert_eq!(frame.to, hero.slides()[1].texture);
        assert_eq!(frame.uniforms.image_resolution_a, [1920.0, 1080.0]);
        assert_eq!(frame.uniforms.image_resolution_b, [1000.0, 500.0]);
        assert!(frame.uniforms.progress > 0.0);
    }

    #[test]
    fn outgoing_slide_keeps_its_framing_when_a_transition_starts() {
        let (mut hero, mut catalog) = controller();
        catalog.mark_ready(hero.slides()[0].texture, 1000, 500);
        catalog.mark_ready(hero.slides()[1].texture, 500, 1000);
        let surface = UVec2::new(800, 600);
        let uv = Vec2::new(0.0, 0.5);

        hero.tick(1.0 / 60.0);
        let idle = hero.frame(0.0, surface, &catalog).unwrap();
        let (idle_a, _) = crossfade::sample_uvs(&idle.uniforms, uv);

        hero.select_slide(1).unwrap();
        hero.tick(1.0 / 60.0);
        let started = hero.frame(0.0, surface, &catalog).unwrap();
        assert_eq!(started.from, idle.from);
        assert_eq!(started.uniforms.image_resolution_a, [1000.0, 500.0]);
        let (started_a, _) = crossfade::sample_uvs(&started.uniforms, uv);
        let p = started.uniforms.progress;
        // Only the progress-weighted warp may move the outgoing sample.
        assert!((started_a - idle_a).length() <= p * hero.warp.amplitude + 1e-6);
    }

    #[test]
    fn incoming_slide_keeps_its_framing_across_the_commit() {
        let (mut hero, mut catalog) = controller();
        catalog.mark_ready(hero.slides()[0].texture, 1000, 500);
        catalog.mark_ready(hero.slides()[1].texture, 500, 1000);
        let surface = UVec2::new(800, 600);
        hero.select_slide(1).unwrap();
        let mut before = hero.frame(0.0, surface, &catalog).unwrap();
        while hero.tick(1.0 / 60.0).is_none() {
            before = hero.frame(0.0, surface, &catalog).unwrap();
        }
        let after = hero.frame(0.0, surface, &catalog).unwrap();
        assert_eq!(after.from, before.to);
        assert_eq!(after.uniforms.image_resolution_a, before.uniforms.image_resolution_b);
    }

    #[test]
    fn empty_slide_list_produces_no_frame() {
        let mut hero = HeroController::new(Vec::new(), &HeroConfig::default());
        hero.advance();
        assert!(hero.tick(0.016).is_none());
        assert!(hero.frame(0.0, UVec2::ONE, &AssetCatalog::default()).is_none());
    }
}
