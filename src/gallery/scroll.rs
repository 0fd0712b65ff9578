use config_model::ScrollConfig;

/// Frame rate the per-tick damping rate is expressed against.
const REFERENCE_FPS: f32 = 60.0;

/// Raw and damped scroll offsets, both normalized to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ScrollState {
    raw: f32,
    damped: f32,
    damping: f32,
}

impl ScrollState {
    pub fn new(damping: f32) -> Self {
        Self {
            raw: 0.0,
            damped: 0.0,
            damping: damping.clamp(f32::EPSILON, 1.0),
        }
    }

    pub fn raw(&self) -> f32 {
        self.raw
    }

    pub fn damped(&self) -> f32 {
        self.damped
    }

    pub fn set_raw(&mut self, offset: f32) {
        if offset.is_finite() {
            self.raw = offset.clamp(0.0, 1.0);
        }
    }

    /// Move the damped offset toward the raw one. At 60 fps this is exactly
    /// `lerp(damped, raw, damping)` per tick; other frame rates get the
    /// equivalent exponential decay so the feel does not depend on refresh.
    pub fn tick(&mut self, delta: f32) -> f32 {
        let frames = delta.max(0.0) * REFERENCE_FPS;
        let keep = (1.0 - self.damping).powf(frames);
        self.damped = (self.raw + (self.damped - self.raw) * keep).clamp(0.0, 1.0);
        self.damped
    }
}

/// Converts wheel and paging input over a virtual `pages`-tall region into
/// a normalized raw offset.
#[derive(Debug, Clone)]
pub struct ScrollInput {
    pages: f32,
    wheel_line_px: f32,
    scrolled_px: f32,
}

impl ScrollInput {
    pub fn new(cfg: &ScrollConfig) -> Self {
        Self {
            pages: cfg.effective_pages(),
            wheel_line_px: cfg.effective_wheel_line_px(),
            scrolled_px: 0.0,
        }
    }

    fn range_px(&self, viewport_height: f32) -> f32 {
        viewport_height.max(0.0) * (self.pages - 1.0)
    }

    /// Scroll by `delta_px` (positive = further down the page) and return the
    /// new offset.
    pub fn scroll_by_pixels(&mut self, delta_px: f32, viewport_height: f32) -> f32 {
        let range = self.range_px(viewport_height);
        if range <= 0.0 || !delta_px.is_finite() {
            return self.offset(viewport_height);
        }
        self.scrolled_px = (self.scrolled_px + delta_px).clamp(0.0, range);
        self.offset(viewport_height)
    }

    pub fn scroll_by_lines(&mut self, lines: f32, viewport_height: f32) -> f32 {
        self.scroll_by_pixels(lines * self.wheel_line_px, viewport_height)
    }

    pub fn scroll_by_pages(&mut self, pages: f32, viewport_height: f32) -> f32 {
        self.scroll_by_pixels(pages * viewport_height, viewport_height)
    }

    pub fn offset(&self, viewport_height: f32) -> f32 {
        let range = self.range_px(viewport_height);
        if range <= 0.0 {
            return 0.0;
        }
        (self.scrolled_px / range).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_reference_frame_is_a_plain_lerp() {
        let mut scroll = ScrollState::new(0.2);
        scroll.set_raw(1.0);
        let damped = scroll.tick(1.0 / 60.0);
        assert!((damped - 0.2).abs() < 1e-5);
    }

    #[test]
    fn damped_converges_to_raw() {
        let mut scroll = ScrollState::new(0.2);
        scroll.set_raw(0.75);
        let mut last = 0.0;
        for _ in 0..600 {
            let next = scroll.tick(1.0 / 60.0);
            assert!(next >= last && next <= 0.75);
            last = next;
        }
        assert!((last - 0.75).abs() < 1e-4);
    }

    #[test]
    fn first_frame_does_not_move() {
        let mut scroll = ScrollState::new(0.2);
        scroll.set_raw(1.0);
        assert_eq!(scroll.tick(0.0), 0.0);
    }

    #[test]
    fn raw_is_clamped() {
        let mut scroll = ScrollState::new(0.2);
        scroll.set_raw(3.0);
        assert_eq!(scroll.raw(), 1.0);
        scroll.set_raw(-1.0);
        assert_eq!(scroll.raw(), 0.0);
        scroll.set_raw(f32::NAN);
        assert_eq!(scroll.raw(), 0.0);
    }

    #[test]
    fn two_pages_span_one_viewport() {
        let mut input = ScrollInput::new(&ScrollConfig::default());
        assert!((input.scroll_by_pixels(540.0, 1080.0) - 0.5).abs() < 1e-6);
        assert_eq!(input.scroll_by_pages(3.0, 1080.0), 1.0);
        assert_eq!(input.scroll_by_lines(-1000.0, 1080.0), 0.0);
    }
}
