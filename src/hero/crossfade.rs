//! Liquid crossfade between two slide textures.
//!
//! The GPU evaluates this in `gpu/shaders/crossfade.wgsl`; the functions here
//! are the same math on the CPU and define what the shader must produce.
//! UVs are y-up (`(0, 0)` is the bottom-left corner of the surface).

use glam::{Vec2, Vec4};

/// Horizontal sine warp applied to both textures while they blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Warp {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for Warp {
    fn default() -> Self {
        Self {
            amplitude: 0.2,
            frequency: 5.0,
        }
    }
}

/// Uniform block uploaded once per frame (48 bytes, matches WGSL layout).
///
/// Each texture is cover-fitted with its own size, so the outgoing slide
/// keeps its framing when a transition starts.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CrossfadeUniforms {
    pub progress: f32,
    pub time: f32,
    pub warp_amplitude: f32,
    pub warp_frequency: f32,
    pub resolution: [f32; 2],
    pub image_resolution_a: [f32; 2],
    pub image_resolution_b: [f32; 2],
    pub _pad: [f32; 2],
}

impl CrossfadeUniforms {
    /// Build a uniform block. A zero-sized surface is bumped to 1x1 and an
    /// unknown or zero-sized image falls back to `fallback_image`.
    pub fn new(
        progress: f32,
        time: f32,
        warp: Warp,
        resolution: Vec2,
        image_a: Option<Vec2>,
        image_b: Option<Vec2>,
        fallback_image: Vec2,
    ) -> Self {
        let resolution = resolution.max(Vec2::ONE);
        let known = |size: Option<Vec2>| {
            size.filter(|size| size.x > 0.0 && size.y > 0.0)
                .unwrap_or(fallback_image)
        };
        Self {
            progress: progress.clamp(0.0, 1.0),
            time,
            warp_amplitude: warp.amplitude,
            warp_frequency: warp.frequency,
            resolution: resolution.to_array(),
            image_resolution_a: known(image_a).to_array(),
            image_resolution_b: known(image_b).to_array(),
            _pad: [0.0; 2],
        }
    }

    pub fn warp(&self) -> Warp {
        Warp {
            amplitude: self.warp_amplitude,
            frequency: self.warp_frequency,
        }
    }
}

/// Remap `uv` so an image of `image_resolution` covers a surface of
/// `resolution` without distortion, cropping the overflow evenly.
pub fn cover_uv(uv: Vec2, resolution: Vec2, image_resolution: Vec2) -> Vec2 {
    let s = resolution;
    let i = image_resolution;
    if s.x <= 0.0 || s.y <= 0.0 || i.x <= 0.0 || i.y <= 0.0 {
        return uv;
    }
    let surface_aspect = s.x / s.y;
    let image_aspect = i.x / i.y;
    let (size, overflow) = if surface_aspect < image_aspect {
        let size = Vec2::new(i.x * s.y / i.y, s.y);
        (size, Vec2::new((size.x - s.x) / 2.0, 0.0))
    } else {
        let size = Vec2::new(s.x, i.y * s.x / i.x);
        (size, Vec2::new(0.0, (size.y - s.y) / 2.0))
    };
    uv * s / size + overflow / size
}

/// Sample coordinates for the outgoing (`a`) and incoming (`b`) textures.
/// Each texture's distortion scales with the other's blend weight.
pub fn warp_uvs(uv: Vec2, progress: f32, warp: Warp) -> (Vec2, Vec2) {
    let wave = warp.amplitude * (uv.y * warp.frequency).sin();
    let uv_a = uv + Vec2::new(progress * wave, 0.0);
    let uv_b = uv - Vec2::new((1.0 - progress) * wave, 0.0);
    (uv_a, uv_b)
}

/// Anything that can be sampled at a y-up UV.
pub trait Sample {
    fn sample(&self, uv: Vec2) -> Vec4;
}

impl<F> Sample for F
where
    F: Fn(Vec2) -> Vec4,
{
    fn sample(&self, uv: Vec2) -> Vec4 {
        self(uv)
    }
}

/// Sample coordinates for both textures at surface coordinate `uv`, each
/// cover-fitted to its own image size before warping.
pub fn sample_uvs(uniforms: &CrossfadeUniforms, uv: Vec2) -> (Vec2, Vec2) {
    let surface = Vec2::from(uniforms.resolution);
    let p = uniforms.progress;
    let warp = uniforms.warp();
    let (uv_a, _) = warp_uvs(
        cover_uv(uv, surface, Vec2::from(uniforms.image_resolution_a)),
        p,
        warp,
    );
    let (_, uv_b) = warp_uvs(
        cover_uv(uv, surface, Vec2::from(uniforms.image_resolution_b)),
        p,
        warp,
    );
    (uv_a, uv_b)
}

/// Color of one output pixel at surface coordinate `uv`.
pub fn blend(a: &impl Sample, b: &impl Sample, uniforms: &CrossfadeUniforms, uv: Vec2) -> Vec4 {
    let p = uniforms.progress;
    let (uv_a, uv_b) = sample_uvs(uniforms, uv);
    a.sample(uv_a) * (1.0 - p) + b.sample(uv_b) * p
}
