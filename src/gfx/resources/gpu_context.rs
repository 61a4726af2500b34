//! Borrowed GPU state handed to scene objects while they sync
//!
//! Nodes and materials never own the device; the renderer lends it to them
//! once per frame together with the shared bind group layouts.

use crate::wgpu_utils::{
    binding_builder::{BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
};

use super::texture_resource::TextureResource;

/// Layouts for the per-object bind groups (groups 1 and 2)
pub struct SceneLayouts {
    pub transform: BindGroupLayoutWithDesc,
    pub material: BindGroupLayoutWithDesc,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let transform = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Transform Bind Group Layout");

        let material = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::linear_sampler())
            .create(device, "Material Bind Group Layout");

        Self {
            transform,
            material,
        }
    }
}

pub struct GpuContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layouts: &'a SceneLayouts,
    pub fallback_texture: &'a TextureResource,
}
