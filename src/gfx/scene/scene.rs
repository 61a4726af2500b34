use cgmath::{InnerSpace, Matrix4, Vector3};
use log::debug;

use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::{global_bindings::LightUniform, gpu_context::GpuContext},
};

use super::node::{root_matrix, world_origin, NodeId, NodeRole, SceneNode};

/// Ambient term applied to every lit surface
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.0,
        }
    }
}

impl AmbientLight {
    pub fn premultiplied(&self) -> [f32; 3] {
        [
            self.color[0] * self.intensity,
            self.color[1] * self.intensity,
            self.color[2] * self.intensity,
        ]
    }
}

/// Squared-exponential distance fog; a density of zero disables it
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub density: f32,
}

impl Fog {
    /// Fraction of the fog colour mixed in at `distance`
    pub fn factor(&self, distance: f32) -> f32 {
        let d = self.density * distance;
        (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
    }

    pub fn packed(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.density]
    }
}

/// Main scene: a forest of nodes plus the camera and global lighting
pub struct Scene {
    pub camera_manager: CameraManager,
    pub ambient: AmbientLight,
    /// Clear colour in linear RGB
    pub background: [f32; 3],
    pub fog: Fog,
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            ambient: AmbientLight::default(),
            background: [0.0, 0.0, 0.0],
            fog: Fog::default(),
            nodes: Vec::new(),
        }
    }

    /// Adds a top-level node and returns its id
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = node.id();
        self.nodes.push(node);
        id
    }

    /// Attaches `node` under `parent`; returns `None` if the parent is gone
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Option<NodeId> {
        self.get_mut(parent).map(|parent| parent.add_child(node))
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find_map(|node| node.find(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Detaches a node (and its subtree) wherever it sits in the graph
    ///
    /// The returned node still owns its GPU buffers; call
    /// [`SceneNode::dispose`] to free them.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        if let Some(position) = self.nodes.iter().position(|node| node.id() == id) {
            return Some(self.nodes.remove(position));
        }
        self.nodes
            .iter_mut()
            .find_map(|node| node.remove_descendant(id))
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Total number of nodes, counting every descendant
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(SceneNode::subtree_len).sum()
    }

    /// Visits every visible node with its world matrix and effective role
    pub fn traverse<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a SceneNode, &Matrix4<f32>, NodeRole),
    {
        let root = root_matrix();
        for node in &self.nodes {
            node.visit(&root, NodeRole::Static, &mut f);
        }
    }

    /// Visits every node mutably, visible or not
    pub fn traverse_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut SceneNode),
    {
        for node in &mut self.nodes {
            node.visit_mut(&mut f);
        }
    }

    /// Gathers lights in world space, nearest to `eye` first, at most `limit`
    pub fn collect_lights(&self, eye: Vector3<f32>, limit: usize) -> Vec<LightUniform> {
        let mut lights = Vec::new();
        self.traverse(|node, world, _| {
            if let Some(light) = node.light_ref() {
                let position = world_origin(world);
                lights.push(((position - eye).magnitude2(), light.uniform(position)));
            }
        });
        if lights.len() > limit {
            lights.sort_by(|a, b| a.0.total_cmp(&b.0));
            lights.truncate(limit);
        }
        lights.into_iter().map(|(_, uniform)| uniform).collect()
    }

    /// Uploads new meshes and refreshes transforms and materials
    pub fn sync_gpu(&mut self, ctx: &GpuContext) {
        let root = root_matrix();
        for node in &mut self.nodes {
            node.sync_gpu(ctx, &root);
        }
    }

    /// Releases every GPU allocation held by the scene
    pub fn dispose(&mut self) {
        for node in &mut self.nodes {
            node.dispose();
        }
        debug!("Disposed scene with {} nodes", self.node_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{CameraController, OrbitCamera},
        scene::node::Light,
    };
    use cgmath::Zero;

    fn test_scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.5, 1.0)))
    }

    #[test]
    fn test_add_and_remove_nested() {
        let mut scene = test_scene();
        let group = scene.add(SceneNode::group("desk"));
        let leg = scene
            .add_child(group, SceneNode::group("leg"))
            .expect("parent exists");

        assert_eq!(scene.node_count(), 2);
        assert!(scene.contains(leg));

        let removed = scene.remove(leg).expect("leg was attached");
        assert_eq!(removed.name, "leg");
        assert!(!scene.contains(leg));
        assert!(scene.remove(leg).is_none());
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_lights_use_world_position() {
        let mut scene = test_scene();
        scene.add(
            SceneNode::group("desk")
                .with_position(12.0, 0.0, 0.0)
                .with_child(
                    SceneNode::light("spot", Light::point(0xffffff, 2.0, 10.0))
                        .with_position(0.0, 5.0, 0.0),
                ),
        );

        let lights = scene.collect_lights(Vector3::zero(), 8);
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].position_range[0], 12.0);
        assert_eq!(lights[0].position_range[1], 5.0);
    }

    #[test]
    fn test_light_limit_keeps_nearest() {
        let mut scene = test_scene();
        for x in [30.0, 1.0, 20.0] {
            scene.add(
                SceneNode::light("l", Light::point(0xffffff, 1.0, 0.0)).with_position(x, 0.0, 0.0),
            );
        }
        let lights = scene.collect_lights(Vector3::zero(), 2);
        assert_eq!(lights.len(), 2);
        assert_eq!(lights[0].position_range[0], 1.0);
        assert_eq!(lights[1].position_range[0], 20.0);
    }

    #[test]
    fn test_hidden_nodes_are_skipped() {
        let mut scene = test_scene();
        let id = scene.add(SceneNode::group("hidden"));
        if let Some(node) = scene.get_mut(id) {
            node.visible = false;
        }
        let mut visited = 0;
        scene.traverse(|_, _, _| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_fog_thickens_with_distance() {
        let fog = Fog {
            color: [0.1; 3],
            density: 0.035,
        };
        assert_eq!(fog.factor(0.0), 0.0);
        assert!(fog.factor(10.0) < fog.factor(30.0));
        // 1 - e^-1 at one over the density
        assert!((fog.factor(1.0 / 0.035) - 0.632).abs() < 1e-3);
        assert!(fog.factor(500.0) > 0.999);
        assert_eq!(Fog::default().factor(1000.0), 0.0);
    }
}
