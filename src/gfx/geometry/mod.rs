//! # Procedural Geometry Generation
//!
//! Functions that generate the primitive shapes the gallery is built from,
//! so no external model files are needed.
//!
//! ## Supported Primitives
//!
//! - **Box**: axis-aligned box of arbitrary size
//! - **Sphere**: UV sphere, optionally partial (used for the dome)
//! - **Plane / Circle**: flat shapes in the XY plane facing +Z
//! - **Cylinder / Cone**: along the Y axis, optionally open-ended
//! - **Torus**: ring in the XY plane
//!
//! All shapes use a Y-up coordinate system.
//!
//! ## Usage
//!
//! ```no_run
//! use orbital_gallery::gfx::geometry::{generate_box, generate_sphere};
//!
//! let frame = generate_box(4.0, 3.0, 0.2);
//! let planet = generate_sphere(5.0, 32, 32);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::{object::Mesh, vertex::Vertex3D};

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts into the interleaved vertex format used by the renderer
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                color: [1.0, 1.0, 1.0],
            })
            .collect()
    }

    /// Builds a triangle mesh from this geometry
    pub fn into_mesh(self) -> Mesh {
        let vertices = self.to_vertices();
        Mesh::triangles(vertices, self.indices)
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}
