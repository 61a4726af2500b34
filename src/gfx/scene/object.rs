use log::trace;
use wgpu::Device;

use crate::gfx::picking::AABB;

use super::vertex::Vertex3D;

/// How the vertex stream is assembled into primitives
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Points,
    LineStrip,
}

impl Topology {
    pub fn primitive_topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        }
    }
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    topology: Topology,
    bounds: AABB,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    /// Indexed triangle list
    pub fn triangles(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self::with_topology(vertices, indices, Topology::Triangles)
    }

    /// One point per vertex
    pub fn points(vertices: Vec<Vertex3D>) -> Self {
        Self::with_topology(vertices, Vec::new(), Topology::Points)
    }

    /// Connected line through the vertices in order
    pub fn line_strip(vertices: Vec<Vertex3D>) -> Self {
        Self::with_topology(vertices, Vec::new(), Topology::LineStrip)
    }

    fn with_topology(vertices: Vec<Vertex3D>, indices: Vec<u32>, topology: Topology) -> Self {
        let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
        Self {
            bounds: AABB::from_vertices(&positions),
            vertices,
            indices,
            topology,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Local-space bounding box
    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    /// Iterates triangles as vertex position triples (empty for points and lines)
    pub fn triangle_positions(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        let indices: &[u32] = match self.topology {
            Topology::Triangles => &self.indices,
            _ => &[],
        };
        indices.chunks_exact(3).filter_map(move |tri| {
            Some([
                self.vertices.get(tri[0] as usize)?.position,
                self.vertices.get(tri[1] as usize)?.position,
                self.vertices.get(tri[2] as usize)?.position,
            ])
        })
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// Uploads vertex and index data once
    pub fn init_gpu_resources(&mut self, device: &Device) {
        if self.vertex_buffer.is_some() || self.vertices.is_empty() {
            return;
        }

        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        self.vertex_buffer = Some(vertex_buffer);

        if !self.indices.is_empty() {
            let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
                device,
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(&self.indices),
                    usage: wgpu::BufferUsages::INDEX,
                },
            );
            self.index_buffer = Some(index_buffer);
        }
    }

    /// Releases vertex and index buffers
    pub fn dispose(&mut self) {
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
        }
        if let Some(buffer) = self.index_buffer.take() {
            buffer.destroy();
        }
        trace!("Disposed mesh with {} vertices", self.vertices.len());
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let vertex_buffer = match &mesh.vertex_buffer {
            Some(buffer) => buffer,
            None => return, // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        match &mesh.index_buffer {
            Some(index_buffer) => {
                self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                self.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);
            }
            None => self.draw(0..mesh.vertices.len() as u32, 0..1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    #[test]
    fn test_box_mesh_bounds() {
        let mesh = generate_box(4.0, 3.0, 0.2).into_mesh();
        let bounds = mesh.bounds();
        assert!((bounds.max.x - 2.0).abs() < 1e-6);
        assert!((bounds.min.y + 1.5).abs() < 1e-6);
        assert_eq!(mesh.topology(), Topology::Triangles);
        assert_eq!(mesh.triangle_positions().count(), 12);
    }

    #[test]
    fn test_point_meshes_have_no_triangles() {
        let mesh = Mesh::points(vec![Vertex3D::point([0.0, 0.0, 0.0], [1.0; 3]); 5]);
        assert_eq!(mesh.topology(), Topology::Points);
        assert_eq!(mesh.triangle_positions().count(), 0);
        assert!(!mesh.is_uploaded());
    }
}
