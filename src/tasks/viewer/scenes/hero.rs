use super::{RenderCtx, Scene, SceneContext};
use crate::gpu::crossfade::CrossfadePipeline;
use crate::gpu::texture::TextureCache;
use crate::stage::Stage;
use crate::tasks::autoplay::AutoAdvance;

pub struct HeroScene {
    pipeline: CrossfadePipeline,
    has_frame: bool,
    // Dropping the scene stops auto-advance.
    _autoplay: AutoAdvance,
}

impl HeroScene {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, autoplay: AutoAdvance) -> Self {
        Self {
            pipeline: CrossfadePipeline::new(device, format),
            has_frame: false,
            _autoplay: autoplay,
        }
    }
}

impl Scene for HeroScene {
    fn on_enter(&mut self, ctx: &SceneContext) {
        tracing::debug!(size = ?ctx.surface_size(), "hero_scene_enter");
    }

    fn prepare(&mut self, ctx: &SceneContext, stage: &Stage, textures: &TextureCache) {
        let frame = stage
            .hero()
            .frame(stage.elapsed(), ctx.surface_extent(), stage.catalog());
        self.has_frame = frame.is_some();
        if let Some(frame) = frame {
            self.pipeline.prepare(ctx.device, ctx.queue, textures, &frame);
        }
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_, '_>) {
        let mut rpass = ctx.begin_pass("hero-pass", wgpu::Color::BLACK);
        if self.has_frame {
            self.pipeline.draw(&mut rpass);
        }
    }
}
