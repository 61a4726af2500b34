//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by every mesh in the gallery: lit
//! triangle meshes, point clouds and line trails all use [`Vertex3D`].

/// A 3D vertex with position, normal, texture coordinate and colour.
///
/// Point clouds leave the normal at zero and carry their per-star tint in
/// `color`; regular meshes use white so the material colour passes through.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the layout C-compatible for GPU buffer uploads.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// Normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
    /// Texture coordinates [u, v]
    pub uv: [f32; 2],
    /// Linear RGB vertex colour multiplied into the material colour
    pub color: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];

    /// Vertex carrying only a position and colour (points and lines)
    pub fn point(position: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            normal: [0.0; 3],
            uv: [0.0; 2],
            color,
        }
    }

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3)
    /// - Attribute 1: Normal (Float32x3)
    /// - Attribute 2: UV (Float32x2)
    /// - Attribute 3: Colour (Float32x3)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
