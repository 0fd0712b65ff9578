pub mod item;
pub mod picking;
pub mod scroll;

use config_model::{GalleryConfig, ScrollConfig};
use glam::{Mat4, Vec2, Vec3};
use tracing::debug;

use crate::assets::{AssetCatalog, AssetId};
use crate::error::ShowcaseError;
use item::{GalleryItem, ItemStyle, ItemTick, RingLayout};
use picking::PointerEvent;
use scroll::{ScrollInput, ScrollState};

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Perspective camera fixed at `position`, looking at the world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub fov_y_radians: f32,
}

impl Camera {
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let projection = Mat4::perspective_rh(self.fov_y_radians, aspect, NEAR_PLANE, FAR_PLANE);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        projection * view
    }
}

/// The scroll-driven ring of images.
#[derive(Debug, Clone)]
pub struct GalleryController {
    items: Vec<GalleryItem>,
    scroll: ScrollState,
    input: ScrollInput,
    layout: RingLayout,
    style: ItemStyle,
    camera: Camera,
    group_offset: Vec3,
}

impl GalleryController {
    pub fn new(
        textures: &[AssetId],
        gallery: &GalleryConfig,
        scroll: &ScrollConfig,
    ) -> Self {
        let total = textures.len();
        let initial_scale = Vec2::from(gallery.effective_initial_scale());
        let items = textures
            .iter()
            .enumerate()
            .map(|(index, texture)| GalleryItem::new(index, total, *texture, initial_scale))
            .collect();
        let mut controller = Self {
            items,
            scroll: ScrollState::new(scroll.effective_damping()),
            input: ScrollInput::new(scroll),
            layout: RingLayout::from_config(gallery),
            style: ItemStyle::from_config(gallery),
            camera: Camera {
                position: Vec3::from(gallery.effective_camera_position()),
                fov_y_radians: gallery.effective_camera_fov_degrees().to_radians(),
            },
            group_offset: Vec3::from(gallery.effective_group_offset()),
        };
        // Place every item on the ring before the first frame.
        controller.tick_items(0.0);
        controller
    }

    pub fn from_config(
        gallery: &GalleryConfig,
        scroll: &ScrollConfig,
        catalog: &mut AssetCatalog,
    ) -> Self {
        let textures: Vec<AssetId> = gallery
            .images()
            .iter()
            .map(|path| catalog.intern(path))
            .collect();
        Self::new(&textures, gallery, scroll)
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position
    }

    pub fn group_offset(&self) -> Vec3 {
        self.group_offset
    }

    pub fn hovered(&self) -> Option<usize> {
        self.items.iter().position(GalleryItem::is_hovered)
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut GalleryItem, ShowcaseError> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(ShowcaseError::ItemOutOfRange { index, len })
    }

    pub fn pointer_enter(&mut self, index: usize) -> Result<(), ShowcaseError> {
        self.item_mut(index)?.set_hovered(true);
        debug!(item = index, "gallery item hovered");
        Ok(())
    }

    pub fn pointer_leave(&mut self, index: usize) -> Result<(), ShowcaseError> {
        self.item_mut(index)?.set_hovered(false);
        debug!(item = index, "gallery item left");
        Ok(())
    }

    pub fn apply_pointer(&mut self, event: PointerEvent) -> Result<(), ShowcaseError> {
        match event {
            PointerEvent::Enter(index) => self.pointer_enter(index),
            PointerEvent::Leave(index) => self.pointer_leave(index),
        }
    }

    /// Set the raw scroll offset directly, e.g. from a scripted timeline.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll.set_raw(offset);
    }

    pub fn scroll_by_pixels(&mut self, delta_px: f32, viewport_height: f32) {
        let offset = self.input.scroll_by_pixels(delta_px, viewport_height);
        self.scroll.set_raw(offset);
    }

    pub fn scroll_by_lines(&mut self, lines: f32, viewport_height: f32) {
        let offset = self.input.scroll_by_lines(lines, viewport_height);
        self.scroll.set_raw(offset);
    }

    pub fn scroll_by_pages(&mut self, pages: f32, viewport_height: f32) {
        let offset = self.input.scroll_by_pages(pages, viewport_height);
        self.scroll.set_raw(offset);
    }

    pub fn tick_scroll(&mut self, delta: f32) -> f32 {
        self.scroll.tick(delta)
    }

    /// Advance every item using the current damped scroll offset. Items are
    /// independent; order does not matter.
    pub fn tick_items(&mut self, delta: f32) {
        let tick = ItemTick {
            delta,
            damped_offset: self.scroll.damped(),
            layout: self.layout,
            style: self.style,
            group_offset: self.group_offset,
            viewer: self.camera.position,
        };
        for item in &mut self.items {
            item.tick(&tick);
        }
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.camera.view_projection(aspect)
    }

    /// Item indices sorted back to front from the camera.
    pub fn draw_order(&self) -> Vec<usize> {
        let eye = self.camera.position;
        let mut order: Vec<(usize, f32)> = self
            .items
            .iter()
            .map(|item| {
                let distance = item.world_position(self.group_offset).distance_squared(eye);
                (item.index(), distance)
            })
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        order.into_iter().map(|(index, _)| index).collect()
    }

    /// Item under the cursor, given in normalized device coordinates.
    pub fn pick(&self, cursor_ndc: Vec2, aspect: f32) -> Option<usize> {
        picking::pick(
            &self.items,
            self.group_offset,
            self.view_projection(aspect),
            cursor_ndc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery() -> (GalleryController, AssetCatalog) {
        let mut catalog = AssetCatalog::new("");
        let gallery = GalleryController::from_config(
            &GalleryConfig::default(),
            &ScrollConfig::default(),
            &mut catalog,
        );
        (gallery, catalog)
    }

    #[test]
    fn default_ring_has_nine_items_sharing_three_textures() {
        let (gallery, catalog) = gallery();
        assert_eq!(gallery.items().len(), 9);
        assert_eq!(catalog.len(), 3);
        assert_eq!(gallery.items()[0].texture(), gallery.items()[3].texture());
    }

    #[test]
    fn items_are_placed_before_first_frame() {
        let (gallery, _) = gallery();
        let first = gallery.items()[0].position();
        assert!((first - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn hover_out_of_range_is_an_error() {
        let (mut gallery, _) = gallery();
        let err = gallery.pointer_enter(42).unwrap_err();
        assert!(matches!(err, ShowcaseError::ItemOutOfRange { index: 42, len: 9 }));
        gallery.pointer_enter(3).unwrap();
        assert_eq!(gallery.hovered(), Some(3));
        gallery.pointer_leave(3).unwrap();
        assert_eq!(gallery.hovered(), None);
    }

    #[test]
    fn draw_order_is_back_to_front() {
        let (gallery, _) = gallery();
        let eye = gallery.camera_position();
        let offset = gallery.group_offset();
        let distances: Vec<f32> = gallery
            .draw_order()
            .into_iter()
            .map(|i| gallery.items()[i].world_position(offset).distance(eye))
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn cursor_above_the_ring_picks_nothing() {
        let (gallery, _) = gallery();
        assert_eq!(gallery.pick(Vec2::new(0.0, 0.9), 16.0 / 9.0), None);
    }

    #[test]
    fn front_item_is_picked_at_its_projection() {
        let (mut gallery, _) = gallery();
        // Rotate a quarter turn so item 0 sits at angle pi/2, on +Z.
        gallery.set_scroll_offset(0.25);
        for _ in 0..600 {
            gallery.tick_scroll(1.0 / 60.0);
        }
        gallery.tick_items(0.0);
        let aspect = 16.0 / 9.0;
        let center = gallery.items()[0].world_position(gallery.group_offset());
        let clip = gallery.view_projection(aspect) * center.extend(1.0);
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        assert_eq!(gallery.pick(ndc, aspect), Some(0));
    }

    #[test]
    fn wheel_lines_move_raw_offset_only() {
        let (mut gallery, _) = gallery();
        gallery.scroll_by_lines(3.0, 1080.0);
        assert!(gallery.scroll().raw() > 0.0);
        assert_eq!(gallery.scroll().damped(), 0.0);
    }
}
