//! # Object Picking System
//!
//! Mouse ray-casting against the scene graph.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: Convert mouse coordinates to a world-space ray
//! 2. **Broad phase**: Test the ray against each mesh's world bounding box
//! 3. **Narrow phase**: Test the triangles of surviving meshes in local space
//! 4. **Selection**: Return the closest hit together with the node's role
//!
//! Only triangle meshes are pickable; point clouds and trails are ignored.
//!
//! ## Usage
//!
//! ```no_run
//! # use orbital_gallery::gfx::{picking::ObjectPicker, scene::Scene};
//! # fn demo(scene: &Scene) {
//! let picker = ObjectPicker::new();
//! let camera = &scene.camera_manager.camera;
//! if let Some(hit) = picker.pick_object((400.0, 300.0), (800.0, 600.0), camera, scene) {
//!     println!("Hovering {:?} at {}", hit.role, hit.distance);
//! }
//! # }
//! ```

use cgmath::{
    ElementWise, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, Vector4,
    Zero,
};

use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    scene::{NodeId, NodeRole, Scene},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Moves the ray into the space described by `inverse` (not renormalised,
    /// so parameters stay comparable with the source space)
    fn transformed(&self, inverse: &Matrix4<f32>) -> Ray {
        let origin = *inverse * self.origin.extend(1.0);
        let direction = *inverse * self.direction.extend(0.0);
        Ray {
            origin: origin.truncate() / origin.w,
            direction: direction.truncate(),
        }
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let mut min = Vector3::new(vertices[0][0], vertices[0][1], vertices[0][2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    /// Slab test; returns the entry distance, or the exit distance when the
    /// origin is inside the box
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed: Vec<[f32; 3]> = corners
            .iter()
            .map(|corner| {
                let p = *matrix * Vector4::new(corner.x, corner.y, corner.z, 1.0);
                [p.x / p.w, p.y / p.w, p.z / p.w]
            })
            .collect();

        Self::from_vertices(&transformed)
    }

    /// Grows the box slightly so flat shapes still have volume
    fn padded(&self, epsilon: f32) -> Self {
        let pad = Vector3::new(epsilon, epsilon, epsilon);
        Self::new(self.min - pad, self.max + pad)
    }
}

/// Möller–Trumbore; hits on either side of the triangle count
pub fn intersect_triangle(ray: &Ray, triangle: &[[f32; 3]; 3]) -> Option<f32> {
    let v0 = Vector3::from(triangle[0]);
    let v1 = Vector3::from(triangle[1]);
    let v2 = Vector3::from(triangle[2]);
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-9 {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > 1e-6).then_some(t)
}

/// Result of an object picking operation
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Node that was hit
    pub node: NodeId,
    /// Role of the node (inherited from its ancestors when it has none)
    pub role: NodeRole,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Object picker for 3D mouse selection
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectPicker;

impl ObjectPicker {
    pub fn new() -> Self {
        Self
    }

    /// Convert screen coordinates to a world-space ray starting at the eye
    ///
    /// Hit distances along the ray are therefore distances from the camera.
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
    ) -> Ray {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = screen_size;

        // Normalized device coordinates (-1 to 1), Y up
        let ndc_x = (2.0 * mouse_x) / screen_width.max(1.0) - 1.0;
        let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height.max(1.0);

        let eye = Point3::from_vec(camera.eye);
        let target = Point3::from_vec(camera.target);
        let view_matrix = Matrix4::look_at_rh(eye, target, camera.up);
        let proj_matrix = cgmath::perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar);

        let view_proj_matrix = proj_matrix * view_matrix;
        let inv_view_proj = view_proj_matrix
            .invert()
            .unwrap_or(Matrix4::from_scale(1.0));

        // OpenGL-style clip space, matching `perspective` above
        let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far_3d = world_far.truncate() / world_far.w;

        Ray::new(camera.eye, far_3d - camera.eye)
    }

    /// Pick the nearest triangle mesh under the mouse
    pub fn pick_object(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
        scene: &Scene,
    ) -> Option<PickResult> {
        let ray = self.screen_to_ray(screen_pos, screen_size, camera);
        self.cast(&ray, scene)
    }

    /// Nearest hit along an arbitrary world-space ray
    pub fn cast(&self, ray: &Ray, scene: &Scene) -> Option<PickResult> {
        let mut closest: Option<PickResult> = None;

        scene.traverse(|node, world, role| {
            let Some(mesh) = node.mesh_ref() else {
                return;
            };

            let world_bounds = mesh.bounds().transform(world).padded(1e-3);
            let Some(box_distance) = world_bounds.intersect_ray(ray) else {
                return;
            };
            if closest
                .as_ref()
                .is_some_and(|hit| box_distance > hit.distance && !inside(&world_bounds, ray))
            {
                return;
            }

            let Some(inverse) = world.invert() else {
                return;
            };
            let local_ray = ray.transformed(&inverse);

            let nearest_local = mesh
                .triangle_positions()
                .filter_map(|triangle| intersect_triangle(&local_ray, &triangle))
                .min_by(|a, b| a.total_cmp(b));

            if let Some(t) = nearest_local {
                // The local direction is not normalised, so `t` is already a
                // world-space parameter along the original ray
                let intersection_point = ray.point_at(t);
                let distance = (intersection_point - ray.origin).magnitude();
                if closest.as_ref().map_or(true, |hit| distance < hit.distance) {
                    closest = Some(PickResult {
                        node: node.id(),
                        role,
                        distance,
                        intersection_point,
                    });
                }
            }
        });

        closest
    }
}

fn inside(bounds: &AABB, ray: &Ray) -> bool {
    let o = ray.origin;
    o.x >= bounds.min.x
        && o.y >= bounds.min.y
        && o.z >= bounds.min.z
        && o.x <= bounds.max.x
        && o.y <= bounds.max.y
        && o.z <= bounds.max.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{CameraController, CameraManager},
        geometry::{generate_box, generate_plane},
        resources::Material,
        scene::SceneNode,
    };

    fn scene_with_camera() -> Scene {
        let camera = OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.5, 1.0)))
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let triangle = [[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]];
        let hit = Ray::new(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        let miss = Ray::new(Vector3::new(3.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert!((intersect_triangle(&hit, &triangle).unwrap() - 3.0).abs() < 1e-5);
        assert!(intersect_triangle(&miss, &triangle).is_none());
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let scene = scene_with_camera();
        let ray = ObjectPicker::new().screen_to_ray(
            (400.0, 300.0),
            (800.0, 600.0),
            &scene.camera_manager.camera,
        );
        assert!((ray.direction.z + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_hit_distance_is_measured_from_the_eye() {
        let mut scene = scene_with_camera();
        scene.add(SceneNode::mesh(
            "wall",
            generate_plane(4.0, 4.0, 1, 1).into_mesh(),
            Material::default(),
        ));
        let picker = ObjectPicker::new();
        let camera = &scene.camera_manager.camera;

        let ray = picker.screen_to_ray((390.0, 295.0), (800.0, 600.0), camera);
        assert!((ray.origin - camera.eye).magnitude() < 1e-6);

        let hit = picker
            .pick_object((390.0, 295.0), (800.0, 600.0), camera, &scene)
            .expect("ray hits the wall");
        // 5 units straight ahead plus a small lateral offset
        assert!(hit.distance > 5.0 && hit.distance < 5.01);
    }

    #[test]
    fn test_nearest_hit_wins_and_reports_role() {
        let mut scene = scene_with_camera();
        scene.add(
            SceneNode::mesh(
                "far",
                generate_box(2.0, 2.0, 0.2).into_mesh(),
                Material::default(),
            )
            .with_position(0.0, 0.0, -3.0),
        );
        let near = scene.add(
            SceneNode::group("frame")
                .with_role(NodeRole::ArtworkFrame(2))
                .with_child(SceneNode::mesh(
                    "corner",
                    generate_plane(1.0, 1.0, 1, 1).into_mesh(),
                    Material::default(),
                ))
                .with_position(0.0, 0.0, 0.1),
        );

        // Slightly off centre so the ray misses the shared diagonal
        let hit = ObjectPicker::new()
            .pick_object(
                (390.0, 295.0),
                (800.0, 600.0),
                &scene.camera_manager.camera,
                &scene,
            )
            .expect("ray hits the plane");

        assert_eq!(hit.role, NodeRole::ArtworkFrame(2));
        assert_ne!(hit.node, near);
        assert!((hit.distance - 4.9).abs() < 1e-2);
    }

    #[test]
    fn test_points_are_not_pickable() {
        use crate::gfx::scene::{Mesh, Vertex3D};
        let mut scene = scene_with_camera();
        scene.add(SceneNode::mesh(
            "stars",
            Mesh::points(vec![Vertex3D::point([0.0, 0.0, 0.0], [1.0; 3])]),
            Material::default(),
        ));
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ObjectPicker::new().cast(&ray, &scene).is_none());
    }
}
