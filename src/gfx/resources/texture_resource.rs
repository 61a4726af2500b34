//! Texture resource management for wgpu
//!
//! Decoded images travel between threads as [`TextureImage`] (plain RGBA8
//! bytes); only the render thread turns them into a [`TextureResource`].

use log::warn;

use crate::error::Result;

/// Largest texture edge requested from the device and accepted from disk
pub const MAX_TEXTURE_DIMENSION: u32 = 4096;

/// Size that fits `width` x `height` inside `max` on both axes, keeping the
/// aspect ratio
pub fn fitted_size(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = max as f64 / width.max(height) as f64;
    let fit = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max);
    (fit(width), fit(height))
}

/// CPU-side RGBA8 image, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Decodes an encoded image (JPEG or PNG), downscaling anything larger
    /// than [`MAX_TEXTURE_DIMENSION`]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        }
        .fit_within(MAX_TEXTURE_DIMENSION))
    }

    /// Resamples the image so neither edge exceeds `max`
    pub fn fit_within(self, max: u32) -> Self {
        let (width, height) = fitted_size(self.width, self.height, max);
        if (width, height) == (self.width, self.height) {
            return self;
        }
        let Some(source) = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone()) else {
            return self;
        };
        warn!(
            "Downscaling {}x{} texture to {}x{}",
            self.width, self.height, width, height
        );
        let resized = image::imageops::resize(&source, width, height, image::imageops::FilterType::Triangle);
        Self {
            width,
            height,
            rgba: resized.into_raw(),
        }
    }

    /// A single-colour image; used as the fallback texture
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width * height) as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.rgba.len() == (self.width * self.height * 4) as usize
    }
}

/// A texture on the GPU with the view and sampler it is bound with
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

fn sampler(device: &wgpu::Device, label: &str, address_mode: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{} Sampler", label)),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

impl TextureResource {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        size: wgpu::Extent3d,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        address_mode: wgpu::AddressMode,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            sampler: sampler(device, label, address_mode),
        }
    }

    /// Depth target sized to the surface; recreated on every resize
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        Self::allocate(
            device,
            label,
            extent(config.width, config.height),
            Self::DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            wgpu::AddressMode::ClampToEdge,
        )
    }

    /// Uploads a decoded image; colours stay in display space like the rest
    /// of the shading inputs
    ///
    /// The sampler repeats in both directions so materials can tile the
    /// image through their UV scale. Images beyond the device's texture limit
    /// are downscaled first.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: &str,
    ) -> Self {
        let limit = device.limits().max_texture_dimension_2d;
        let fitted;
        let image = if image.width > limit || image.height > limit {
            fitted = image.clone().fit_within(limit);
            &fitted
        } else {
            image
        };
        let size = extent(image.width, image.height);
        let resource = Self::allocate(
            device,
            label,
            size,
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            wgpu::AddressMode::Repeat,
        );

        queue.write_texture(
            resource.texture.as_image_copy(),
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        resource
    }

    /// 1x1 white texture bound by untextured materials
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_image(
            device,
            queue,
            &TextureImage::solid(1, 1, [255; 4]),
            "Fallback White Texture",
        )
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
