use glam::{Mat4, Vec2, Vec3, Vec4};

use super::item::GalleryItem;

/// Corners of the unit quad every item is drawn with, counter-clockwise.
const QUAD_CORNERS: [Vec3; 4] = [
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(-0.5, 0.5, 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(usize),
    Leave(usize),
}

/// Window pixel coordinates (origin top-left) to normalized device coordinates.
pub fn cursor_to_ndc(cursor_px: Vec2, surface_px: Vec2) -> Vec2 {
    let surface = surface_px.max(Vec2::ONE);
    Vec2::new(
        cursor_px.x / surface.x * 2.0 - 1.0,
        1.0 - cursor_px.y / surface.y * 2.0,
    )
}

fn inside_convex(point: Vec2, polygon: &[Vec2; 4]) -> bool {
    let mut sign = 0.0_f32;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let cross = (b - a).perp_dot(point - a);
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Nearest item whose projected quad contains `cursor_ndc`.
pub fn pick(
    items: &[GalleryItem],
    group_offset: Vec3,
    view_projection: Mat4,
    cursor_ndc: Vec2,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for item in items {
        let mvp = view_projection * item.model_matrix(group_offset);
        let mut projected = [Vec2::ZERO; 4];
        let mut behind = false;
        for (slot, corner) in projected.iter_mut().zip(QUAD_CORNERS) {
            let clip: Vec4 = mvp * corner.extend(1.0);
            if clip.w <= f32::EPSILON {
                behind = true;
                break;
            }
            *slot = clip.truncate().truncate() / clip.w;
        }
        if behind || !inside_convex(cursor_ndc, &projected) {
            continue;
        }
        let depth = (mvp * Vec4::new(0.0, 0.0, 0.0, 1.0)).w;
        if best.is_none_or(|(_, nearest)| depth < nearest) {
            best = Some((item.index(), depth));
        }
    }
    best.map(|(index, _)| index)
}

/// Turns per-frame hit results into enter/leave transitions. At most one item
/// is hovered at a time.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    current: Option<usize>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn update(&mut self, hit: Option<usize>) -> Vec<PointerEvent> {
        if hit == self.current {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.current {
            events.push(PointerEvent::Leave(previous));
        }
        if let Some(next) = hit {
            events.push(PointerEvent::Enter(next));
        }
        self.current = hit;
        events
    }

    pub fn clear(&mut self) -> Vec<PointerEvent> {
        self.update(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_maps_corners_to_ndc() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(cursor_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(cursor_to_ndc(size, size), Vec2::new(1.0, -1.0));
        assert_eq!(cursor_to_ndc(size / 2.0, size), Vec2::ZERO);
    }

    #[test]
    fn convex_test_accepts_either_winding() {
        let square = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        let mut reversed = square;
        reversed.reverse();
        assert!(inside_convex(Vec2::ZERO, &square));
        assert!(inside_convex(Vec2::ZERO, &reversed));
        assert!(!inside_convex(Vec2::new(1.5, 0.0), &square));
    }

    #[test]
    fn tracker_emits_leave_before_enter() {
        let mut tracker = HoverTracker::default();
        assert_eq!(tracker.update(Some(1)), vec![PointerEvent::Enter(1)]);
        assert!(tracker.update(Some(1)).is_empty());
        assert_eq!(
            tracker.update(Some(4)),
            vec![PointerEvent::Leave(1), PointerEvent::Enter(4)]
        );
        assert_eq!(tracker.clear(), vec![PointerEvent::Leave(4)]);
        assert_eq!(tracker.current(), None);
    }
}
