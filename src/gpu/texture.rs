use std::collections::HashMap;

use glam::UVec2;

use crate::assets::AssetId;
use crate::error::ShowcaseError;
use crate::events::PreparedTexture;

pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub size: UVec2,
}

pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    pixels: &[u8],
    w: u32,
    h: u32,
) -> GpuTexture {
    let extent = wgpu::Extent3d {
        width: w,
        height: h,
        depth_or_array_layers: 1,
    };
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        tex.as_image_copy(),
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        extent,
    );
    GpuTexture {
        view: tex.create_view(&wgpu::TextureViewDescriptor::default()),
        size: UVec2::new(w, h),
    }
}

/// Check a decoded image against its own dimensions and the device limit
/// before anything touches the GPU.
pub fn validate_upload(texture: &PreparedTexture, max_dimension: u32) -> Result<(), ShowcaseError> {
    let expected = texture.width as usize * texture.height as usize * 4;
    if texture.width == 0 || texture.height == 0 || texture.pixels.len() != expected {
        return Err(ShowcaseError::TextureSize {
            path: texture.path.clone(),
            width: texture.width,
            height: texture.height,
            bytes: texture.pixels.len(),
        });
    }
    if texture.width > max_dimension || texture.height > max_dimension {
        return Err(ShowcaseError::TextureTooLarge {
            path: texture.path.clone(),
            width: texture.width,
            height: texture.height,
            limit: max_dimension,
        });
    }
    Ok(())
}

/// Uploaded textures by asset, plus a neutral fallback bound for anything
/// still pending or failed. `generation` bumps on every upload so pipelines
/// know when to rebuild bind groups.
pub struct TextureCache {
    fallback: GpuTexture,
    textures: HashMap<AssetId, GpuTexture>,
    generation: u64,
}

impl TextureCache {
    const FALLBACK_PIXEL: [u8; 4] = [24, 24, 24, 255];

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let fallback = upload_texture(device, queue, "fallback-texture", &Self::FALLBACK_PIXEL, 1, 1);
        Self {
            fallback,
            textures: HashMap::new(),
            generation: 0,
        }
    }

    /// Upload a decoded image. Images the device cannot hold are rejected
    /// and the fallback stays bound for that asset.
    pub fn insert(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &PreparedTexture,
    ) -> Result<(), ShowcaseError> {
        validate_upload(texture, device.limits().max_texture_dimension_2d)?;
        let label = format!("asset-{}", texture.id.0);
        let gpu = upload_texture(
            device,
            queue,
            &label,
            &texture.pixels,
            texture.width,
            texture.height,
        );
        self.textures.insert(texture.id, gpu);
        self.generation += 1;
        Ok(())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self, id: AssetId) -> &wgpu::TextureView {
        self.textures
            .get(&id)
            .map(|tex| &tex.view)
            .unwrap_or(&self.fallback.view)
    }

    /// Pixel size of the uploaded texture, `None` while the fallback is bound.
    pub fn size(&self, id: AssetId) -> Option<UVec2> {
        self.textures.get(&id).map(|tex| tex.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(width: u32, height: u32, bytes: usize) -> PreparedTexture {
        PreparedTexture {
            id: AssetId(0),
            path: "slide.png".into(),
            width,
            height,
            pixels: vec![0; bytes],
        }
    }

    #[test]
    fn accepts_images_within_the_device_limit() {
        assert!(validate_upload(&prepared(4096, 1, 4096 * 4), 4096).is_ok());
    }

    #[test]
    fn rejects_images_wider_than_the_device_limit() {
        let err = validate_upload(&prepared(5000, 1, 5000 * 4), 4096).unwrap_err();
        assert!(matches!(
            err,
            ShowcaseError::TextureTooLarge { width: 5000, height: 1, limit: 4096, .. }
        ));
    }

    #[test]
    fn rejects_images_taller_than_the_device_limit() {
        let err = validate_upload(&prepared(1, 8193, 8193 * 4), 8192).unwrap_err();
        assert!(matches!(err, ShowcaseError::TextureTooLarge { height: 8193, .. }));
    }

    #[test]
    fn rejects_pixel_buffers_that_disagree_with_the_dimensions() {
        let err = validate_upload(&prepared(2, 2, 12), 4096).unwrap_err();
        assert!(matches!(err, ShowcaseError::TextureSize { bytes: 12, .. }));
        assert!(validate_upload(&prepared(0, 4, 0), 4096).is_err());
    }
}
