use crate::assets::AssetId;
use crate::hero::HeroFrame;
use crate::hero::crossfade::CrossfadeUniforms;

use super::texture::TextureCache;
use super::{Vertex, quad_buffer, sampler_entry, texture_entry, uniform_entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundPair {
    from: AssetId,
    to: AssetId,
    generation: u64,
}

/// Full-screen pass blending two slide textures.
pub struct CrossfadePipeline {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,
    vbuf: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
    bound: Option<BoundPair>,
}

impl CrossfadePipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("crossfade-bind-layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("crossfade-shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(include_str!(
                "shaders/crossfade.wgsl"
            ))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("crossfade-pipeline-layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("crossfade-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        // The warp pushes sample coordinates past the edges; mirror them back.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("crossfade-sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("crossfade-uniforms"),
            size: std::mem::size_of::<CrossfadeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            sampler,
            uniforms,
            vbuf: quad_buffer(device, "crossfade-quad"),
            bind_group: None,
            bound: None,
        }
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device, cache: &TextureCache, pair: BoundPair) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("crossfade-bind-group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(cache.view(pair.from)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(cache.view(pair.to)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.uniforms.as_entire_binding(),
                },
            ],
        }));
        self.bound = Some(pair);
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cache: &TextureCache,
        frame: &HeroFrame,
    ) {
        let pair = BoundPair {
            from: frame.from,
            to: frame.to,
            generation: cache.generation(),
        };
        if self.bound != Some(pair) {
            tracing::trace!(from = pair.from.0, to = pair.to.0, "rebinding crossfade textures");
            self.rebuild_bind_group(device, cache, pair);
        }
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&frame.uniforms));
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        let Some(bind) = &self.bind_group else {
            return;
        };
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, bind, &[]);
        rpass.set_vertex_buffer(0, self.vbuf.slice(..));
        rpass.draw(0..4, 0..1);
    }
}
