use super::{RenderCtx, Scene, SceneContext};
use crate::gpu::gallery::GalleryPipeline;
use crate::gpu::texture::TextureCache;
use crate::stage::Stage;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.025,
    a: 1.0,
};

pub struct GalleryScene {
    pipeline: GalleryPipeline,
}

impl GalleryScene {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            pipeline: GalleryPipeline::new(device, format),
        }
    }
}

impl Scene for GalleryScene {
    fn on_enter(&mut self, ctx: &SceneContext) {
        tracing::debug!(size = ?ctx.surface_size(), "gallery_scene_enter");
    }

    fn prepare(&mut self, ctx: &SceneContext, stage: &Stage, textures: &TextureCache) {
        self.pipeline
            .prepare(ctx.device, ctx.queue, textures, stage.gallery(), ctx.aspect());
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_, '_>) {
        let mut rpass = ctx.begin_pass("gallery-pass", BACKGROUND);
        self.pipeline.draw(&mut rpass);
    }
}
