//! Static gallery room: floor, glass walls, dome, lighting rig, desks,
//! chandelier, floor lights, dust, the starfield, skybox and fog

use std::f32::consts::PI;

use cgmath::Vector3;
use log::info;
use rand::Rng;

use crate::{
    config::GalleryConfig,
    gfx::{
        geometry::{generate_circle, generate_cylinder, generate_sphere_section},
        resources::Material,
        scene::{hex_to_rgb, AmbientLight, Fog, Light, NodeId, Scene, SceneNode},
    },
};

use super::{
    factory::{
        central_chandelier, glass, hanging_chandelier, luxury_desk, pedestal, GOLD, WARM_WHITE,
    },
    space::{dust, skybox, starfield, TextureRequest},
};

pub const BACKGROUND: u32 = 0x1a1a1a;

const ACCENT_COLORS: [u32; 3] = [WARM_WHITE, 0xffd700, 0xfaf0e6];

/// Handles to the room pieces the animation loop touches
pub struct GalleryRoom {
    pub floor: NodeId,
    pub dust: NodeId,
    pub starfield: NodeId,
    pub desks: Vec<NodeId>,
    pub chandelier: NodeId,
    /// Hidden until all of their textures have loaded
    pub skybox: Vec<NodeId>,
}

/// Builds the whole static room into `scene`
pub fn assemble<R: Rng>(
    scene: &mut Scene,
    config: &GalleryConfig,
    rng: &mut R,
    textures: &mut Vec<TextureRequest>,
) -> GalleryRoom {
    scene.background = hex_to_rgb(BACKGROUND);
    scene.fog = Fog {
        color: hex_to_rgb(config.fog_color),
        density: config.fog_density,
    };
    let skybox = skybox(scene, config, textures);

    let starfield = scene.add(starfield(rng, config.star_count));
    setup_lighting(scene);

    let floor = add_main_room(scene);
    textures.push(TextureRequest {
        location: config.floor_texture.clone(),
        target: floor,
    });

    let desks = add_display_desks(scene, config);

    let chandelier = scene.add(
        central_chandelier(rng, config.crystal_count).with_position(0.0, 7.0, 0.0),
    );
    let dust = scene.add(dust(rng, config.dust_particles));
    add_floor_lighting(scene, config);

    if config.decorations {
        add_decorations(scene);
    }

    info!("Gallery room assembled with {} nodes", scene.node_count());
    GalleryRoom {
        floor,
        dust,
        starfield,
        desks,
        chandelier,
        skybox,
    }
}

/// Ambient fill, overhead spotlight and four warm accent lights
pub fn setup_lighting(scene: &mut Scene) {
    scene.ambient = AmbientLight {
        color: [1.0; 3],
        intensity: 0.3,
    };

    scene.add(
        SceneNode::light(
            "Main Spotlight",
            Light::spot(0xffffff, 1.5, 40.0, Vector3::new(0.0, 0.0, 0.0), PI / 6.0),
        )
        .with_position(0.0, 10.0, 0.0),
    );

    for (i, x) in [-6.0, -2.0, 2.0, 6.0].into_iter().enumerate() {
        scene.add(
            SceneNode::light("Accent Light", Light::point(ACCENT_COLORS[i % 3], 0.8, 8.0))
                .with_position(x, 3.0, -8.0),
        );
    }
}

/// Marble floor, open glass cylinder and dome; returns the floor
fn add_main_room(scene: &mut Scene) -> NodeId {
    let floor = scene.add(
        SceneNode::mesh(
            "Marble Floor",
            generate_circle(20.0, 64).into_mesh(),
            Material::new("Marble", [0.92, 0.91, 0.89], 0.2, 0.1).with_uv_repeat(8.0, 8.0),
        )
        .with_rotation(-PI / 2.0, 0.0, 0.0),
    );

    scene.add(
        SceneNode::mesh(
            "Glass Walls",
            generate_cylinder(19.5, 19.5, 8.0, 64, true).into_mesh(),
            glass(0.2, 0.9),
        )
        .with_position(0.0, 4.0, 0.0),
    );

    scene.add(
        SceneNode::mesh(
            "Dome",
            generate_sphere_section(20.0, 64, 32, 0.0, PI * 2.0, 0.0, PI / 2.0).into_mesh(),
            glass(0.3, 0.5),
        )
        .with_position(0.0, 8.0, 0.0),
    );

    floor
}

fn add_display_desks(scene: &mut Scene, config: &GalleryConfig) -> Vec<NodeId> {
    (0..config.desk_count)
        .map(|i| {
            let angle = i as f32 / config.desk_count as f32 * PI * 2.0;
            let position = Vector3::new(
                angle.cos() * config.desk_radius,
                0.0,
                angle.sin() * config.desk_radius,
            );
            let mut desk = luxury_desk(position)
                .with_position(position.x, position.y, position.z);
            desk.transform.rotation.y = angle + PI / 2.0;
            scene.add(desk)
        })
        .collect()
}

fn add_floor_lighting(scene: &mut Scene, config: &GalleryConfig) {
    let radius = config.floor_light_radius;
    for i in 0..config.floor_light_count {
        let angle = i as f32 / config.floor_light_count as f32 * PI * 2.0;
        scene.add(
            SceneNode::light("Floor Light", Light::point(GOLD, 0.5, 5.0)).with_position(
                angle.cos() * radius,
                0.1,
                angle.sin() * radius,
            ),
        );
    }
}

/// Gold pedestals along the back and two hanging lamps
fn add_decorations(scene: &mut Scene) {
    for x in [-8.0, -4.0, 4.0, 8.0] {
        scene.add(pedestal().with_position(x, 0.0, -6.0));
    }
    for x in [-6.0, 6.0] {
        scene.add(hanging_chandelier().with_position(x, 6.0, -5.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use cgmath::{InnerSpace, Zero};
    use rand::{rngs::StdRng, SeedableRng};

    fn scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.5, 1.0)))
    }

    fn small_config() -> GalleryConfig {
        GalleryConfig {
            star_count: 10,
            dust_particles: 10,
            ..GalleryConfig::default()
        }
    }

    fn count_lights(scene: &Scene) -> usize {
        let mut lights = 0;
        scene.traverse(|node, _, _| {
            if node.light_ref().is_some() {
                lights += 1;
            }
        });
        lights
    }

    #[test]
    fn test_lighting_rig() {
        let mut scene = scene();
        let mut rng = StdRng::seed_from_u64(1);
        let mut textures = Vec::new();
        let room = assemble(&mut scene, &small_config(), &mut rng, &mut textures);

        // main + 4 accents + 8 desk spots + chandelier + 16 floor lights
        assert_eq!(count_lights(&scene), 30);
        assert_eq!(room.desks.len(), 8);
        assert!((scene.ambient.intensity - 0.3).abs() < 1e-6);
        // six skybox faces, then the floor
        assert_eq!(textures.len(), 7);
        assert_eq!(textures[6].target, room.floor);
        assert_eq!(room.skybox.len(), 6);
    }

    #[test]
    fn test_room_carries_fog() {
        let mut scene = scene();
        let mut rng = StdRng::seed_from_u64(1);
        assemble(&mut scene, &small_config(), &mut rng, &mut Vec::new());
        assert_eq!(scene.fog.color, hex_to_rgb(0x1a1a1a));
        assert!((scene.fog.density - 0.035).abs() < 1e-6);
        assert_eq!(scene.background, scene.fog.color);
    }

    #[test]
    fn test_desks_ring_the_room() {
        let mut scene = scene();
        let mut rng = StdRng::seed_from_u64(1);
        let room = assemble(&mut scene, &small_config(), &mut rng, &mut Vec::new());
        for id in room.desks {
            let desk = scene.get(id).unwrap();
            let p = desk.transform.position;
            assert!((Vector3::new(p.x, 0.0, p.z).magnitude() - 12.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_decorations_are_optional() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut plain = scene();
        assemble(&mut plain, &small_config(), &mut rng, &mut Vec::new());

        let mut rng = StdRng::seed_from_u64(1);
        let mut decorated = scene();
        assemble(
            &mut decorated,
            &small_config().with_decorations(true),
            &mut rng,
            &mut Vec::new(),
        );

        // 4 pedestals + 2 lamps of 3 nodes each
        assert_eq!(decorated.node_count(), plain.node_count() + 10);
        assert_eq!(count_lights(&decorated), count_lights(&plain) + 2);
    }
}
