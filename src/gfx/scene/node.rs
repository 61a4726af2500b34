//! Scene graph nodes
//!
//! A [`SceneNode`] is a mesh with its own material, a light, or a group of
//! child nodes. Transforms compose parent-to-child.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::{InnerSpace, Matrix4, Rad, SquareMatrix, Vector3, Vector4, Zero};

use crate::{
    gfx::resources::{
        global_bindings::LightUniform, gpu_context::GpuContext, material::Material,
    },
    wgpu_utils::{binding_builder::BindGroupBuilder, uniform_buffer::UniformBuffer},
};

use super::object::Mesh;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a node for as long as it lives in a scene
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What a node means to the gallery's interaction logic
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum NodeRole {
    /// Scenery with no interaction
    #[default]
    Static,
    /// Part of the frame around artwork `n`
    ArtworkFrame(usize),
    /// The image plane of artwork `n`
    ArtworkPlane(usize),
}

impl NodeRole {
    /// Index of the artwork this node belongs to, if any
    pub fn artwork_index(self) -> Option<usize> {
        match self {
            NodeRole::Static => None,
            NodeRole::ArtworkFrame(index) | NodeRole::ArtworkPlane(index) => Some(index),
        }
    }
}

/// Translation, Euler rotation (radians, applied X then Y then Z) and scale
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Matrix4<f32> {
        let rotation = Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        Matrix4::from_translation(self.position)
            * rotation
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Cone restriction for a spot light, aimed at a fixed world point
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotCone {
    pub target: Vector3<f32>,
    /// Half-angle in radians
    pub angle: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the contribution reaches zero; 0 never cuts off
    pub range: f32,
    pub spot: Option<SpotCone>,
}

impl Light {
    pub fn point(hex: u32, intensity: f32, range: f32) -> Self {
        Self {
            color: hex_to_rgb(hex),
            intensity,
            range,
            spot: None,
        }
    }

    pub fn spot(hex: u32, intensity: f32, range: f32, target: Vector3<f32>, angle: f32) -> Self {
        Self {
            spot: Some(SpotCone { target, angle }),
            ..Self::point(hex, intensity, range)
        }
    }

    /// Packs the light for the shader given its world position
    pub fn uniform(&self, world_position: Vector3<f32>) -> LightUniform {
        let direction_cone = match &self.spot {
            Some(cone) => {
                let to_target = cone.target - world_position;
                let direction = if to_target.magnitude2() > f32::EPSILON {
                    to_target.normalize()
                } else {
                    -Vector3::unit_y()
                };
                [direction.x, direction.y, direction.z, cone.angle.cos()]
            }
            None => [0.0, -1.0, 0.0, LightUniform::NO_CONE],
        };
        LightUniform {
            position_range: [world_position.x, world_position.y, world_position.z, self.range],
            color_intensity: [self.color[0], self.color[1], self.color[2], self.intensity],
            direction_cone,
        }
    }
}

pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub enum NodeContent {
    Group,
    Mesh { mesh: Mesh, material: Material },
    Light(Light),
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

struct NodeGpu {
    ubo: UniformBuffer<TransformUniform>,
    bind_group: wgpu::BindGroup,
}

pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub role: NodeRole,
    pub visible: bool,
    pub content: NodeContent,
    children: Vec<SceneNode>,
    gpu: Option<NodeGpu>,
}

impl SceneNode {
    fn new(name: &str, content: NodeContent) -> Self {
        Self {
            id: NodeId::next(),
            name: name.to_string(),
            transform: Transform::default(),
            role: NodeRole::Static,
            visible: true,
            content,
            children: Vec::new(),
            gpu: None,
        }
    }

    pub fn mesh(name: &str, mesh: Mesh, material: Material) -> Self {
        Self::new(name, NodeContent::Mesh { mesh, material })
    }

    pub fn group(name: &str) -> Self {
        Self::new(name, NodeContent::Group)
    }

    pub fn light(name: &str, light: Light) -> Self {
        Self::new(name, NodeContent::Light(light))
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn add_child(&mut self, child: SceneNode) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    pub fn mesh_ref(&self) -> Option<&Mesh> {
        match &self.content {
            NodeContent::Mesh { mesh, .. } => Some(mesh),
            _ => None,
        }
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.content {
            NodeContent::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.content {
            NodeContent::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn light_ref(&self) -> Option<&Light> {
        match &self.content {
            NodeContent::Light(light) => Some(light),
            _ => None,
        }
    }

    pub(crate) fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub(crate) fn remove_descendant(&mut self, id: NodeId) -> Option<SceneNode> {
        if let Some(position) = self.children.iter().position(|child| child.id == id) {
            return Some(self.children.remove(position));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    /// Number of nodes in this subtree, including itself
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SceneNode::subtree_len).sum::<usize>()
    }

    /// Depth-first visit with world matrices and inherited roles
    pub(crate) fn visit<'a, F>(&'a self, parent: &Matrix4<f32>, parent_role: NodeRole, f: &mut F)
    where
        F: FnMut(&'a SceneNode, &Matrix4<f32>, NodeRole),
    {
        if !self.visible {
            return;
        }
        let world = *parent * self.transform.matrix();
        let role = match self.role {
            NodeRole::Static => parent_role,
            own => own,
        };
        f(self, &world, role);
        for child in &self.children {
            child.visit(&world, role, f);
        }
    }

    pub(crate) fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut SceneNode),
    {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// Uploads buffers that are missing and refreshes per-frame uniforms
    pub(crate) fn sync_gpu(&mut self, ctx: &GpuContext, parent: &Matrix4<f32>) {
        let world = *parent * self.transform.matrix();

        if let NodeContent::Mesh { mesh, material } = &mut self.content {
            mesh.init_gpu_resources(ctx.device);
            material.update_gpu_resources(ctx);

            let uniform = TransformUniform {
                model: world.into(),
            };
            match &mut self.gpu {
                Some(gpu) => gpu.ubo.update_content(ctx.queue, uniform),
                None => {
                    let ubo = UniformBuffer::with_content(ctx.device, &uniform);
                    let bind_group = BindGroupBuilder::new(&ctx.layouts.transform)
                        .resource(ubo.binding_resource())
                        .create(ctx.device, &format!("{} Transform Bind Group", self.name));
                    self.gpu = Some(NodeGpu { ubo, bind_group });
                }
            }
        }

        for child in &mut self.children {
            child.sync_gpu(ctx, &world);
        }
    }

    pub fn transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }

    /// Frees every GPU allocation in this subtree
    pub fn dispose(&mut self) {
        if let NodeContent::Mesh { mesh, material } = &mut self.content {
            mesh.dispose();
            material.dispose();
        }
        if let Some(gpu) = self.gpu.take() {
            gpu.ubo.destroy();
        }
        for child in &mut self.children {
            child.dispose();
        }
    }
}

/// World-space position of a node's origin
pub fn world_origin(world: &Matrix4<f32>) -> Vector3<f32> {
    let origin = *world * Vector4::new(0.0, 0.0, 0.0, 1.0);
    origin.truncate()
}

/// Identity transform used as the root of every traversal
pub fn root_matrix() -> Matrix4<f32> {
    Matrix4::identity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_ids_are_unique() {
        let a = SceneNode::group("a");
        let b = SceneNode::group("b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_rotation_then_translation() {
        let transform = Transform {
            position: Vector3::new(1.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, FRAC_PI_2, 0.0),
            ..Default::default()
        };
        // +Z rotated a quarter turn about Y lands on +X, then shifts by 1
        let p = transform.matrix() * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!(p.z.abs() < 1e-5);
    }

    #[test]
    fn test_roles_are_inherited_by_children() {
        let frame = SceneNode::group("frame")
            .with_role(NodeRole::ArtworkFrame(3))
            .with_child(SceneNode::group("corner"));

        let mut roles = Vec::new();
        frame.visit(&root_matrix(), NodeRole::Static, &mut |node, _, role| {
            roles.push((node.name.clone(), role))
        });
        assert_eq!(roles[1], ("corner".to_string(), NodeRole::ArtworkFrame(3)));
    }

    #[test]
    fn test_remove_nested_descendant() {
        let inner = SceneNode::group("inner");
        let inner_id = inner.id();
        let mut outer =
            SceneNode::group("outer").with_child(SceneNode::group("middle").with_child(inner));
        assert_eq!(outer.subtree_len(), 3);
        assert!(outer.remove_descendant(inner_id).is_some());
        assert_eq!(outer.subtree_len(), 2);
        assert!(outer.find(inner_id).is_none());
    }

    #[test]
    fn test_spot_light_points_at_target() {
        let light = Light::spot(0xffffff, 2.0, 10.0, Vector3::zero(), 0.5);
        let uniform = light.uniform(Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(uniform.direction_cone[1], -1.0);
        assert!((uniform.direction_cone[3] - 0.5f32.cos()).abs() < 1e-6);
        assert_eq!(uniform.position_range[3], 10.0);
    }
}
