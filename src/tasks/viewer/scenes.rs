use glam::UVec2;
use winit::dpi::PhysicalSize;

use crate::gpu::texture::TextureCache;
use crate::stage::Stage;

pub mod gallery;
pub mod hero;

pub struct SceneContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_config: &'a wgpu::SurfaceConfiguration,
}

impl<'a> SceneContext<'a> {
    pub fn surface_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.surface_config.width, self.surface_config.height)
    }

    pub fn surface_extent(&self) -> UVec2 {
        UVec2::new(self.surface_config.width.max(1), self.surface_config.height.max(1))
    }

    pub fn aspect(&self) -> f32 {
        let size = self.surface_extent().as_vec2();
        size.x / size.y
    }
}

pub struct RenderCtx<'a, 'b> {
    pub scene: SceneContext<'a>,
    pub encoder: &'b mut wgpu::CommandEncoder,
    pub target_view: &'b wgpu::TextureView,
}

impl RenderCtx<'_, '_> {
    pub fn begin_pass(&mut self, label: &str, clear: wgpu::Color) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.target_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

pub trait Scene {
    fn on_enter(&mut self, _ctx: &SceneContext) {}
    fn on_exit(&mut self, _ctx: &SceneContext) {}
    /// Upload this frame's uniforms from the already-ticked stage.
    fn prepare(&mut self, ctx: &SceneContext, stage: &Stage, textures: &TextureCache);
    fn render(&mut self, ctx: &mut RenderCtx<'_, '_>);
}
