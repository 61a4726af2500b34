//! Procedural space backdrop: orbiting planets, star clusters, nebulae, the
//! starfield and the skybox
//!
//! Far backdrop geometry ignores scene fog.

use std::f32::consts::PI;

use cgmath::Vector3;
use log::debug;
use rand::Rng;

use crate::{
    config::GalleryConfig,
    gfx::{
        geometry::{generate_plane, generate_sphere},
        resources::{BlendMode, Material},
        scene::{NodeId, Scene, SceneNode, Vertex3D},
    },
};

use super::factory::{hsl_to_rgb, particle_field, particle_material};

const TAU: f32 = PI * 2.0;

/// Circular orbit in the XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub angle: f32,
    /// Radians per tick
    pub speed: f32,
    pub distance: f32,
}

impl OrbitState {
    /// Steps the orbit once; the angle stays in `[0, 2π)`
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.speed).rem_euclid(TAU);
    }

    pub fn position(&self, y: f32) -> Vector3<f32> {
        Vector3::new(
            self.angle.cos() * self.distance,
            y,
            self.angle.sin() * self.distance,
        )
    }
}

pub struct Planet {
    pub node: NodeId,
    pub orbit: OrbitState,
}

/// A texture to stream in for a node once the scene exists
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    pub location: String,
    pub target: NodeId,
}

/// Animated handles into the backdrop
pub struct SpaceEnvironment {
    pub planets: Vec<Planet>,
    pub clusters: Vec<NodeId>,
    pub nebulae: Vec<NodeId>,
}

/// `(radius, orbit distance, speed)` per planet
const PLANETS: [(f32, f32, f32); 3] = [(5.0, 100.0, 0.0001), (3.0, 150.0, 0.00015), (8.0, 200.0, 0.00005)];

const NEBULA_COLORS: [u32; 3] = [0x5500ff, 0x00ff88, 0xff5500];

/// Unit offset and rotation turning a +Z facing plane into each inward skybox
/// face, in +x, -x, +y, -y, +z, -z order
const SKYBOX_FACES: [([f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, -PI / 2.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, PI / 2.0, 0.0]),
    ([0.0, 1.0, 0.0], [PI / 2.0, 0.0, 0.0]),
    ([0.0, -1.0, 0.0], [-PI / 2.0, 0.0, 0.0]),
    ([0.0, 0.0, 1.0], [0.0, PI, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 0.0, 0.0]),
];

fn centred<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * extent
}

impl SpaceEnvironment {
    /// Adds planets, clusters and nebulae to `scene`
    pub fn build<R: Rng>(
        scene: &mut Scene,
        config: &GalleryConfig,
        rng: &mut R,
        textures: &mut Vec<TextureRequest>,
    ) -> Self {
        let planets = PLANETS
            .iter()
            .zip(&config.planet_textures)
            .map(|(&(radius, distance, speed), texture)| {
                let orbit = OrbitState {
                    angle: rng.random::<f32>() * TAU,
                    speed,
                    distance,
                };
                let position = orbit.position(centred(rng, 100.0));
                let node = scene.add(
                    SceneNode::mesh(
                        "Planet",
                        generate_sphere(radius, 32, 32).into_mesh(),
                        Material::new("Planet", [0.6, 0.6, 0.65], 0.2, 0.8).without_fog(),
                    )
                    .with_position(position.x, position.y, position.z),
                );
                textures.push(TextureRequest {
                    location: texture.clone(),
                    target: node,
                });
                Planet { node, orbit }
            })
            .collect();

        let clusters = (0..config.cluster_count)
            .map(|_| scene.add(star_cluster(rng, config.cluster_particles)))
            .collect();

        let nebulae = NEBULA_COLORS
            .iter()
            .map(|&color| scene.add(nebula(rng, color, config.nebula_particles)))
            .collect();

        debug!("Space environment built");
        Self {
            planets,
            clusters,
            nebulae,
        }
    }
}

/// Inward-facing cube of `config.skybox_size` around the origin
///
/// Faces start hidden, so the flat background colour shows until every face
/// texture has arrived; one [`TextureRequest`] is queued per face.
pub fn skybox(
    scene: &mut Scene,
    config: &GalleryConfig,
    textures: &mut Vec<TextureRequest>,
) -> Vec<NodeId> {
    let size = config.skybox_size;
    let half = size / 2.0;
    SKYBOX_FACES
        .iter()
        .zip(&config.skybox_textures)
        .map(|(&([x, y, z], [rx, ry, rz]), location)| {
            let mut face = SceneNode::mesh(
                "Skybox Face",
                generate_plane(size, size, 1, 1).into_mesh(),
                Material::unlit("Skybox", [1.0; 3])
                    .with_blend(BlendMode::Background)
                    .without_fog(),
            )
            .with_position(x * half, y * half, z * half)
            .with_rotation(rx, ry, rz);
            face.visible = false;

            let id = scene.add(face);
            textures.push(TextureRequest {
                location: location.clone(),
                target: id,
            });
            id
        })
        .collect()
}

/// Sphere of blue-green stars around a random centre
pub fn star_cluster<R: Rng>(rng: &mut R, count: usize) -> SceneNode {
    let center = Vector3::new(centred(rng, 500.0), centred(rng, 500.0), centred(rng, 500.0));
    let points = (0..count)
        .map(|_| {
            let radius = rng.random::<f32>() * 50.0;
            let theta = rng.random::<f32>() * TAU;
            let phi = rng.random::<f32>() * PI;
            let color = hsl_to_rgb(rng.random::<f32>() * 0.2 + 0.5, 0.7, 0.5);
            Vertex3D::point(
                [
                    center.x + radius * phi.sin() * theta.cos(),
                    center.y + radius * phi.sin() * theta.sin(),
                    center.z + radius * phi.cos(),
                ],
                color,
            )
        })
        .collect();
    particle_field(
        "Star Cluster",
        points,
        particle_material("Star Cluster", 0xffffff, 0.8, BlendMode::Additive).without_fog(),
    )
}

/// Cube of glowing particles in a single colour
pub fn nebula<R: Rng>(rng: &mut R, color: u32, count: usize) -> SceneNode {
    let center = Vector3::new(centred(rng, 400.0), centred(rng, 400.0), centred(rng, 400.0));
    let points = (0..count)
        .map(|_| {
            Vertex3D::point(
                [
                    center.x + centred(rng, 100.0),
                    center.y + centred(rng, 100.0),
                    center.z + centred(rng, 100.0),
                ],
                [1.0; 3],
            )
        })
        .collect();
    particle_field(
        "Nebula",
        points,
        particle_material("Nebula", color, 0.5, BlendMode::Additive).without_fog(),
    )
}

/// Background stars in a 1000-unit cube, white to pale blue
pub fn starfield<R: Rng>(rng: &mut R, count: usize) -> SceneNode {
    let points = (0..count)
        .map(|_| {
            let position = [centred(rng, 1000.0), centred(rng, 1000.0), centred(rng, 1000.0)];
            let color = [
                rng.random::<f32>() * 0.3 + 0.7,
                rng.random::<f32>() * 0.3 + 0.7,
                1.0,
            ];
            Vertex3D::point(position, color)
        })
        .collect();
    particle_field(
        "Starfield",
        points,
        particle_material("Starfield", 0xffffff, 0.8, BlendMode::Normal).without_fog(),
    )
}

/// Dust drifting inside the room
pub fn dust<R: Rng>(rng: &mut R, count: usize) -> SceneNode {
    let points = (0..count)
        .map(|_| {
            Vertex3D::point(
                [centred(rng, 30.0), rng.random::<f32>() * 8.0, centred(rng, 20.0)],
                [1.0; 3],
            )
        })
        .collect();
    particle_field(
        "Dust",
        points,
        particle_material("Dust", 0xffffff, 0.3, BlendMode::Normal),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use cgmath::{InnerSpace, Vector4, Zero};
    use rand::{rngs::StdRng, SeedableRng};

    fn scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.5, 1.0)))
    }

    #[test]
    fn test_orbit_angle_follows_speed_and_wraps() {
        let mut orbit = OrbitState {
            angle: 6.0,
            speed: 0.1,
            distance: 100.0,
        };
        for _ in 0..10 {
            orbit.advance();
        }
        let expected = (6.0_f32 + 1.0).rem_euclid(TAU);
        assert!((orbit.angle - expected).abs() < 1e-4);
        assert!((0.0..TAU).contains(&orbit.angle));

        let p = orbit.position(3.0);
        assert!((p.x - orbit.angle.cos() * 100.0).abs() < 1e-3);
        assert!((p.z - orbit.angle.sin() * 100.0).abs() < 1e-3);
        assert_eq!(p.y, 3.0);
    }

    #[test]
    fn test_environment_is_reproducible() {
        let config = GalleryConfig::default();
        let build = |seed| {
            let mut scene = scene();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut textures = Vec::new();
            let env = SpaceEnvironment::build(&mut scene, &config, &mut rng, &mut textures);
            let angles: Vec<f32> = env.planets.iter().map(|p| p.orbit.angle).collect();
            (env, angles, textures.len(), scene.node_count())
        };
        let (env, angles, textures, nodes) = build(11);
        let (_, again, _, _) = build(11);
        assert_eq!(angles, again);
        assert_eq!(env.planets.len(), 3);
        assert_eq!(env.clusters.len(), 5);
        assert_eq!(env.nebulae.len(), 3);
        assert_eq!(textures, 3);
        assert_eq!(nodes, 11);
    }

    #[test]
    fn test_particle_counts_and_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let stars = starfield(&mut rng, 500);
        let mesh = stars.mesh_ref().unwrap();
        assert_eq!(mesh.vertices().len(), 500);
        assert!(mesh
            .vertices()
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() <= 500.0) && v.color[2] == 1.0));

        let room_dust = dust(&mut rng, 200);
        assert!(room_dust
            .mesh_ref()
            .unwrap()
            .vertices()
            .iter()
            .all(|v| (0.0..=8.0).contains(&v.position[1])));
    }

    #[test]
    fn test_skybox_faces_point_inward_and_wait_for_textures() {
        let mut scene = scene();
        let mut textures = Vec::new();
        let faces = skybox(&mut scene, &GalleryConfig::default(), &mut textures);
        assert_eq!(faces.len(), 6);
        assert_eq!(textures.len(), 6);
        assert_eq!(textures[0].location, "textures/space/px.jpg");
        assert_eq!(textures[5].location, "textures/space/nz.jpg");

        for (id, request) in faces.iter().zip(&textures) {
            assert_eq!(request.target, *id);
            let face = scene.get(*id).unwrap();
            assert!(!face.visible);
            assert_eq!(face.material().unwrap().blend, BlendMode::Background);
            assert!(!face.material().unwrap().fog);

            let p = face.transform.position;
            assert!((p.magnitude() - 400.0).abs() < 1e-3);
            let normal = face.transform.matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
            let facing = Vector3::new(normal.x, normal.y, normal.z);
            assert!((facing + p.normalize()).magnitude() < 1e-4);
        }
    }
}
