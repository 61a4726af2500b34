//! Global uniform bindings for camera and lighting data
//!
//! Group 0 of every pipeline: the camera, the ambient and fog terms, and a
//! fixed-size array of point lights gathered from the scene graph each frame.

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Lights beyond this count are dropped (nearest to the camera are kept)
pub const MAX_LIGHTS: usize = 48;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz world position, w = range (0 means unbounded)
    pub position_range: [f32; 4],
    /// rgb colour, w = intensity
    pub color_intensity: [f32; 4],
    /// xyz spot direction, w = cosine of the cone half-angle (-2 for point lights)
    pub direction_cone: [f32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            position_range: [0.0; 4],
            color_intensity: [0.0; 4],
            direction_cone: [0.0, -1.0, 0.0, LightUniform::NO_CONE],
        }
    }
}

impl LightUniform {
    pub const NO_CONE: f32 = -2.0;
}

/// MUST match the `Globals` struct in gallery.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    /// rgb ambient colour pre-multiplied by intensity, w = active light count
    pub ambient: [f32; 4],
    /// rgb fog colour, w = density
    pub fog: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl GlobalUniform {
    pub fn new(
        camera: CameraUniform,
        ambient: [f32; 3],
        fog: [f32; 4],
        lights: &[LightUniform],
    ) -> Self {
        let mut packed = [LightUniform::default(); MAX_LIGHTS];
        let count = lights.len().min(MAX_LIGHTS);
        packed[..count].copy_from_slice(&lights[..count]);

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: [ambient[0], ambient[1], ambient[2], count as f32],
            fog,
            lights: packed,
        }
    }

    pub fn light_count(&self) -> usize {
        self.ambient[3] as usize
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Bind group layout and bind group for the global uniforms (slot 0)
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lights_are_truncated_to_capacity() {
        let lights = vec![LightUniform::default(); MAX_LIGHTS + 5];
        let globals = GlobalUniform::new(CameraUniform::default(), [0.3; 3], [0.0; 4], &lights);
        assert_eq!(globals.light_count(), MAX_LIGHTS);
    }

    #[test]
    fn test_fog_follows_ambient() {
        let fog = [0.1, 0.1, 0.1, 0.035];
        let globals = GlobalUniform::new(CameraUniform::default(), [0.2; 3], fog, &[]);
        assert_eq!(globals.fog, fog);
        assert_eq!(globals.light_count(), 0);

        let bytes: &[u8] = bytemuck::bytes_of(&globals);
        let offset = std::mem::offset_of!(GlobalUniform, fog);
        assert_eq!(offset, 16 + 64 + 16);
        assert_eq!(&bytes[offset + 12..offset + 16], &0.035f32.to_ne_bytes());
    }

    #[test]
    fn test_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }
}
