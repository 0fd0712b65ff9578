use glam::Vec2;

use crate::assets::AssetId;
use crate::gallery::GalleryController;

use super::texture::TextureCache;
use super::{Vertex, quad_buffer, sampler_entry, texture_entry, uniform_entry};

/// Per-item uniform block (96 bytes, matches `gallery.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ItemUniforms {
    pub mvp: [[f32; 4]; 4],
    pub plane_size: [f32; 2],
    pub image_size: [f32; 2],
    pub grayscale: f32,
    pub opacity: f32,
    pub _pad: [f32; 2],
}

struct ItemBinding {
    texture: AssetId,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the ring's planes back to front with alpha blending.
pub struct GalleryPipeline {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    vbuf: wgpu::Buffer,
    items: Vec<ItemBinding>,
    generation: Option<u64>,
    order: Vec<usize>,
}

impl GalleryPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gallery-bind-layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gallery-shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(include_str!(
                "shaders/gallery.wgsl"
            ))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gallery-pipeline-layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gallery-pipeline"),
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
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("gallery-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipeline,
            layout,
            sampler,
            vbuf: quad_buffer(device, "gallery-quad"),
            items: Vec::new(),
            generation: None,
            order: Vec::new(),
        }
    }

    fn bind_item(&self, device: &wgpu::Device, cache: &TextureCache, texture: AssetId) -> ItemBinding {
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gallery-item-uniforms"),
            size: std::mem::size_of::<ItemUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gallery-item-bind-group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(cache.view(texture)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        });
        ItemBinding {
            texture,
            uniforms,
            bind_group,
        }
    }

    fn sync_bindings(&mut self, device: &wgpu::Device, cache: &TextureCache, gallery: &GalleryController) {
        let stale = self.generation != Some(cache.generation())
            || self.items.len() != gallery.items().len()
            || self
                .items
                .iter()
                .zip(gallery.items())
                .any(|(bound, item)| bound.texture != item.texture());
        if !stale {
            return;
        }
        tracing::trace!(items = gallery.items().len(), "rebinding gallery textures");
        self.items = gallery
            .items()
            .iter()
            .map(|item| self.bind_item(device, cache, item.texture()))
            .collect();
        self.generation = Some(cache.generation());
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cache: &TextureCache,
        gallery: &GalleryController,
        aspect: f32,
    ) {
        self.sync_bindings(device, cache, gallery);
        let view_projection = gallery.view_projection(aspect);
        let group_offset = gallery.group_offset();
        for (item, binding) in gallery.items().iter().zip(&self.items) {
            let plane = Vec2::new(item.scale().x, item.scale().y);
            let image = cache
                .size(item.texture())
                .map(|size| size.as_vec2())
                .unwrap_or(plane);
            let uniforms = ItemUniforms {
                mvp: (view_projection * item.model_matrix(group_offset)).to_cols_array_2d(),
                plane_size: plane.to_array(),
                image_size: image.to_array(),
                grayscale: item.grayscale().clamp(0.0, 1.0),
                opacity: item.opacity().clamp(0.0, 1.0),
                _pad: [0.0; 2],
            };
            queue.write_buffer(&binding.uniforms, 0, bytemuck::bytes_of(&uniforms));
        }
        self.order = gallery.draw_order();
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.vbuf.slice(..));
        for index in &self.order {
            if let Some(binding) = self.items.get(*index) {
                rpass.set_bind_group(0, &binding.bind_group, &[]);
                rpass.draw(0..4, 0..1);
            }
        }
    }
}
