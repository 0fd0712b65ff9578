use std::f32::consts::{PI, TAU};

use config_model::GalleryConfig;
use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

use crate::assets::AssetId;
use crate::motion::{approach, approach_vec3};

/// Geometry of the ring the items ride on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingLayout {
    pub radius: f32,
    pub wave_amplitude: f32,
}

impl RingLayout {
    pub fn from_config(cfg: &GalleryConfig) -> Self {
        Self {
            radius: cfg.effective_radius(),
            wave_amplitude: cfg.effective_wave_amplitude(),
        }
    }

    /// Position on the ring at `angle`; the vertical wave completes two
    /// periods per revolution.
    pub fn position(&self, angle: f32) -> Vec3 {
        Vec3::new(
            self.radius * angle.cos(),
            self.wave_amplitude * (2.0 * angle).sin(),
            self.radius * angle.sin(),
        )
    }
}

/// Targets and smoothing for per-item visual attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStyle {
    pub hover_scale: f32,
    pub aspect_stretch: f32,
    pub smoothing_rate: f32,
    pub fade_distance: f32,
    pub faded_opacity: f32,
}

impl ItemStyle {
    pub fn from_config(cfg: &GalleryConfig) -> Self {
        Self {
            hover_scale: cfg.effective_hover_scale(),
            aspect_stretch: cfg.effective_aspect_stretch(),
            smoothing_rate: cfg.effective_smoothing_rate(),
            fade_distance: cfg.effective_fade_distance(),
            faded_opacity: cfg.effective_faded_opacity(),
        }
    }

    pub fn target_scale(&self, hovered: bool) -> Vec3 {
        let s = if hovered { self.hover_scale } else { 1.0 };
        Vec3::new(s, s * self.aspect_stretch, 1.0)
    }

    pub fn target_grayscale(&self, hovered: bool) -> f32 {
        if hovered { 0.0 } else { 1.0 }
    }

    pub fn target_opacity(&self, distance_to_viewer: f32) -> f32 {
        if distance_to_viewer > self.fade_distance {
            self.faded_opacity
        } else {
            1.0
        }
    }
}

/// Per-frame inputs shared by every item on the ring.
#[derive(Debug, Clone, Copy)]
pub struct ItemTick {
    pub delta: f32,
    pub damped_offset: f32,
    pub layout: RingLayout,
    pub style: ItemStyle,
    /// Translation of the ring's group in world space.
    pub group_offset: Vec3,
    pub viewer: Vec3,
}

/// Angle of item `index` of `total` with no scroll applied.
pub fn base_angle(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    TAU * index as f32 / total as f32
}

/// Rotation that makes a quad's front face (+Z) point away from the ring
/// center: look at the origin, then turn half a revolution about local Y.
pub fn facing_outward(position: Vec3) -> Quat {
    let half_turn = Quat::from_rotation_y(PI);
    let forward = (-position).normalize_or_zero();
    if forward == Vec3::ZERO {
        return half_turn;
    }
    let mut right = Vec3::Y.cross(forward);
    if right.length_squared() < 1e-12 {
        right = Vec3::X.cross(forward);
    }
    let right = right.normalize();
    let up = forward.cross(right);
    let look = Quat::from_mat3(&Mat3::from_cols(right, up, forward));
    (look * half_turn).normalize()
}

#[derive(Debug, Clone)]
pub struct GalleryItem {
    index: usize,
    total: usize,
    base_angle: f32,
    texture: AssetId,
    angle: f32,
    position: Vec3,
    orientation: Quat,
    scale: Vec3,
    grayscale: f32,
    opacity: f32,
    hovered: bool,
}

impl GalleryItem {
    pub fn new(index: usize, total: usize, texture: AssetId, initial_scale: Vec2) -> Self {
        let base = base_angle(index, total);
        Self {
            index,
            total,
            base_angle: base,
            texture,
            angle: base,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: initial_scale.extend(1.0),
            grayscale: 0.0,
            opacity: 1.0,
            hovered: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn base_angle(&self) -> f32 {
        self.base_angle
    }

    pub fn texture(&self) -> AssetId {
        self.texture
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Position relative to the ring's group.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn world_position(&self, group_offset: Vec3) -> Vec3 {
        self.position + group_offset
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn grayscale(&self) -> f32 {
        self.grayscale
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn model_matrix(&self, group_offset: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.orientation,
            self.world_position(group_offset),
        )
    }

    pub fn tick(&mut self, tick: &ItemTick) {
        self.angle = self.base_angle + tick.damped_offset * TAU;
        self.position = tick.layout.position(self.angle);
        self.orientation = facing_outward(self.position);

        let style = &tick.style;
        let rate = style.smoothing_rate;
        self.scale = approach_vec3(
            self.scale,
            style.target_scale(self.hovered),
            rate,
            tick.delta,
        );
        self.grayscale = approach(
            self.grayscale,
            style.target_grayscale(self.hovered),
            rate,
            tick.delta,
        );
        let distance = self.world_position(tick.group_offset).distance(tick.viewer);
        self.opacity = approach(self.opacity, style.target_opacity(distance), rate, tick.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_with(offset: f32, delta: f32) -> ItemTick {
        let cfg = GalleryConfig::default();
        ItemTick {
            delta,
            damped_offset: offset,
            layout: RingLayout::from_config(&cfg),
            style: ItemStyle::from_config(&cfg),
            group_offset: Vec3::from(cfg.effective_group_offset()),
            viewer: Vec3::from(cfg.effective_camera_position()),
        }
    }

    #[test]
    fn front_item_faces_the_viewer_unrotated() {
        let q = facing_outward(Vec3::new(0.0, 0.0, 4.0));
        assert!((q * Vec3::Z - Vec3::Z).length() < 1e-5);
        assert!((q * Vec3::X - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn front_face_points_away_from_center() {
        let layout = RingLayout::from_config(&GalleryConfig::default());
        for i in 0..9 {
            let p = layout.position(base_angle(i, 9) + 0.1);
            let normal = facing_outward(p) * Vec3::Z;
            assert!(normal.dot(p.normalize()) > 0.999, "item {i} faces inward");
        }
    }

    #[test]
    fn position_follows_ring_formula() {
        let mut item = GalleryItem::new(2, 8, AssetId(0), Vec2::new(1.5, 2.25));
        item.tick(&tick_with(0.0, 0.0));
        let angle = TAU * 2.0 / 8.0;
        let expected = Vec3::new(4.0 * angle.cos(), 0.5 * (2.0 * angle).sin(), 4.0 * angle.sin());
        assert!((item.position() - expected).length() < 1e-5);
    }

    #[test]
    fn hover_only_changes_targets() {
        let style = ItemStyle::from_config(&GalleryConfig::default());
        assert_eq!(style.target_scale(true), Vec3::new(1.2, 1.2 * 1.5, 1.0));
        assert_eq!(style.target_scale(false), Vec3::new(1.0, 1.5, 1.0));
        assert_eq!(style.target_grayscale(true), 0.0);
        assert_eq!(style.target_grayscale(false), 1.0);
    }

    #[test]
    fn opacity_target_uses_fade_distance() {
        let style = ItemStyle::from_config(&GalleryConfig::default());
        assert_eq!(style.target_opacity(6.5), 0.2);
        assert_eq!(style.target_opacity(6.0), 1.0);
    }
}
