//! Surface materials
//!
//! Every mesh node owns its own [`Material`]. Animated properties (opacity
//! fades, the nebula time parameter) are plain fields; the uniform buffer
//! only uploads when the packed content actually changed.

use crate::{
    gfx::scene::node::hex_to_rgb,
    gfx::resources::{
        gpu_context::GpuContext,
        texture_resource::{TextureImage, TextureResource},
    },
    wgpu_utils::{binding_builder::BindGroupBuilder, uniform_buffer::UniformBuffer},
};

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// rgb colour, a = opacity
    pub base_color: [f32; 4],
    /// rgb emission, w = animation time
    pub emissive: [f32; 4],
    /// metallic, roughness, unlit flag, has-texture flag
    pub params: [f32; 4],
    /// uv scale in xy, z = fog weight
    pub uv_repeat: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// How fragments combine with what is already in the colour target
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Normal,
    Additive,
    /// Drawn before everything else without writing depth; skybox faces
    Background,
}

struct MaterialGpu {
    ubo: MaterialUBO,
    texture: Option<TextureResource>,
    bind_group: wgpu::BindGroup,
}

pub struct Material {
    pub name: String,
    pub base_color: [f32; 3],
    pub opacity: f32,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    /// Skip lighting; used by point clouds and trails
    pub unlit: bool,
    pub blend: BlendMode,
    /// Free-running animation parameter read by the shader
    pub time: f32,
    pub uv_repeat: [f32; 2],
    /// Whether scene fog tints this surface
    pub fog: bool,

    texture_image: Option<TextureImage>,
    texture_dirty: bool,
    gpu: Option<MaterialGpu>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8],
            opacity: 1.0,
            metallic: 0.0,
            roughness: 0.5,
            emissive: [0.0, 0.0, 0.0],
            unlit: false,
            blend: BlendMode::Normal,
            time: 0.0,
            uv_repeat: [1.0, 1.0],
            fog: true,
            texture_image: None,
            texture_dirty: false,
            gpu: None,
        }
    }
}

impl Material {
    pub fn new(name: &str, base_color: [f32; 3], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Unlit material for point clouds and line trails
    pub fn unlit(name: &str, base_color: [f32; 3]) -> Self {
        Self {
            unlit: true,
            ..Self::new(name, base_color, 0.0, 1.0)
        }
    }

    /// Builder pattern: Set base color from a packed `0xRRGGBB` value
    pub fn with_hex(mut self, hex: u32) -> Self {
        self.base_color = hex_to_rgb(hex);
        self
    }

    /// Builder pattern: Set base color from RGB values
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b];
        self
    }

    /// Builder pattern: Set opacity; anything below 1.0 renders translucent
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set emissive color
    pub fn with_emission(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emissive = [r, g, b];
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_uv_repeat(mut self, u: f32, v: f32) -> Self {
        self.uv_repeat = [u, v];
        self
    }

    /// Builder pattern: Exempt from scene fog; far backdrop geometry
    pub fn without_fog(mut self) -> Self {
        self.fog = false;
        self
    }

    pub fn with_texture(mut self, image: TextureImage) -> Self {
        self.set_texture(image);
        self
    }

    /// Replaces the colour map; uploaded on the next GPU sync
    pub fn set_texture(&mut self, image: TextureImage) {
        self.texture_image = Some(image);
        self.texture_dirty = true;
    }

    pub fn has_texture(&self) -> bool {
        self.texture_image.is_some()
    }

    /// Whether this material must be drawn in the blended pass
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0 || self.blend == BlendMode::Additive
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: [
                self.base_color[0],
                self.base_color[1],
                self.base_color[2],
                self.opacity,
            ],
            emissive: [self.emissive[0], self.emissive[1], self.emissive[2], self.time],
            params: [
                self.metallic,
                self.roughness,
                if self.unlit { 1.0 } else { 0.0 },
                if self.has_texture() { 1.0 } else { 0.0 },
            ],
            uv_repeat: [
                self.uv_repeat[0],
                self.uv_repeat[1],
                if self.fog { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }

    /// Creates or refreshes GPU resources for this material
    pub fn update_gpu_resources(&mut self, ctx: &GpuContext) {
        if self.gpu.is_none() || self.texture_dirty {
            if let Some(previous) = self.gpu.take() {
                previous.destroy();
            }

            let ubo = MaterialUBO::with_content(ctx.device, &self.uniform());
            let texture = self.texture_image.as_ref().filter(|image| image.is_valid()).map(
                |image| {
                    TextureResource::from_image(
                        ctx.device,
                        ctx.queue,
                        image,
                        &format!("{} Texture", self.name),
                    )
                },
            );
            let bound = texture.as_ref().unwrap_or(ctx.fallback_texture);
            let bind_group = BindGroupBuilder::new(&ctx.layouts.material)
                .resource(ubo.binding_resource())
                .texture(&bound.view)
                .sampler(&bound.sampler)
                .create(ctx.device, &format!("{} Material Bind Group", self.name));

            self.gpu = Some(MaterialGpu {
                ubo,
                texture,
                bind_group,
            });
            self.texture_dirty = false;
        }

        let uniform = self.uniform();
        if let Some(gpu) = &mut self.gpu {
            gpu.ubo.update_content(ctx.queue, uniform);
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }

    /// Frees GPU allocations; the material can be re-uploaded afterwards
    pub fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.destroy();
        }
    }
}

impl MaterialGpu {
    fn destroy(self) {
        self.ubo.destroy();
        if let Some(texture) = &self.texture {
            texture.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_rules() {
        assert!(!Material::default().is_transparent());
        assert!(Material::default().with_opacity(0.3).is_transparent());
        assert!(Material::default()
            .with_blend(BlendMode::Additive)
            .is_transparent());
    }

    #[test]
    fn test_hex_colour_unpacking() {
        let gold = Material::default().with_hex(0xffd700);
        assert_eq!(gold.base_color[0], 1.0);
        assert!((gold.base_color[1] - 215.0 / 255.0).abs() < 1e-6);
        assert_eq!(gold.base_color[2], 0.0);
    }

    #[test]
    fn test_uniform_packs_flags() {
        let material = Material::unlit("stars", [1.0, 1.0, 1.0])
            .with_opacity(0.8)
            .with_texture(TextureImage::solid(1, 1, [0, 0, 0, 255]));
        let uniform = material.uniform();
        assert_eq!(uniform.base_color[3], 0.8);
        assert_eq!(uniform.params[2], 1.0);
        assert_eq!(uniform.params[3], 1.0);
        assert_eq!(uniform.uv_repeat[2], 1.0);
    }

    #[test]
    fn test_fog_exemption_is_packed() {
        let backdrop = Material::unlit("sky", [1.0; 3])
            .with_blend(BlendMode::Background)
            .without_fog();
        assert_eq!(backdrop.uniform().uv_repeat, [1.0, 1.0, 0.0, 0.0]);
        assert!(!backdrop.is_transparent());
    }
}
