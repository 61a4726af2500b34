//! Composite scene pieces built from the procedural primitives
//!
//! Every function returns a detached [`SceneNode`] subtree positioned in its
//! own local space; callers place and add it.

use std::f32::consts::PI;

use cgmath::Vector3;
use rand::Rng;

use crate::gfx::{
    geometry::{
        generate_box, generate_cone, generate_cylinder, generate_plane, generate_torus,
    },
    resources::{BlendMode, Material, TextureImage},
    scene::{Light, Mesh, SceneNode, Vertex3D},
};

pub const GOLD: u32 = 0xb8995c;
pub const WARM_WHITE: u32 = 0xffe5b4;

/// Size of the artwork image plane
pub const ARTWORK_SIZE: (f32, f32) = (3.5, 2.5);

pub fn gold(metallic: f32, roughness: f32) -> Material {
    Material::new("Gold", [0.0; 3], metallic, roughness).with_hex(GOLD)
}

pub fn glass(opacity: f32, metallic: f32) -> Material {
    Material::new("Glass", [1.0; 3], metallic, 0.1).with_opacity(opacity)
}

/// Gold box frame with four raised corners
pub fn luxury_frame() -> SceneNode {
    let mut frame = SceneNode::group("Artwork Frame").with_child(SceneNode::mesh(
        "Frame Border",
        generate_box(4.0, 3.0, 0.2).into_mesh(),
        gold(0.8, 0.2),
    ));

    for x in [-1.85, 1.85] {
        for y in [-1.35, 1.35] {
            frame.add_child(
                SceneNode::mesh(
                    "Frame Corner",
                    generate_box(0.3, 0.3, 0.1).into_mesh(),
                    gold(1.0, 0.1),
                )
                .with_position(x, y, 0.1),
            );
        }
    }
    frame
}

/// Unlit plane showing an artwork image
pub fn artwork_plane(image: TextureImage) -> SceneNode {
    let (width, height) = ARTWORK_SIZE;
    SceneNode::mesh(
        "Artwork",
        generate_plane(width, height, 1, 1).into_mesh(),
        Material::unlit("Artwork", [1.0; 3]).with_texture(image),
    )
}

/// Glass-topped desk with gold legs, display case, trims and a spotlight
///
/// `spot_target` is the world point the desk light aims at.
pub fn luxury_desk(spot_target: Vector3<f32>) -> SceneNode {
    let mut desk = SceneNode::group("Display Desk")
        .with_child(
            SceneNode::mesh(
                "Desk Top",
                generate_box(3.0, 0.1, 2.0).into_mesh(),
                glass(0.5, 0.9),
            )
            .with_position(0.0, 0.9, 0.0),
        )
        .with_child(
            SceneNode::mesh(
                "Display Case",
                generate_box(2.5, 2.0, 1.5).into_mesh(),
                glass(0.3, 0.1),
            )
            .with_position(0.0, 2.0, 0.0),
        );

    for (x, z) in [(-1.4, 0.9), (1.4, 0.9), (-1.4, -0.9), (1.4, -0.9)] {
        desk.add_child(
            SceneNode::mesh(
                "Desk Leg",
                generate_cylinder(0.05, 0.05, 0.9, 8, false).into_mesh(),
                gold(1.0, 0.1),
            )
            .with_position(x, 0.45, z),
        );
    }

    for y in [3.025, 0.975] {
        desk.add_child(
            SceneNode::mesh(
                "Desk Trim",
                generate_box(2.6, 0.05, 1.6).into_mesh(),
                gold(1.0, 0.1),
            )
            .with_position(0.0, y, 0.0),
        );
    }

    desk.with_child(
        SceneNode::light(
            "Desk Spotlight",
            Light::spot(0xffffff, 2.0, 10.0, spot_target, PI / 6.0),
        )
        .with_position(0.0, 5.0, 0.0),
    )
}

pub fn crystal() -> SceneNode {
    SceneNode::mesh(
        "Crystal",
        generate_cone(0.1, 0.4, 6).into_mesh(),
        Material::new("Crystal", [1.0; 3], 0.9, 0.1).with_opacity(0.7),
    )
}

/// Gold ring with hanging crystals and a warm light at its centre
pub fn central_chandelier<R: Rng>(rng: &mut R, crystals: usize) -> SceneNode {
    let mut chandelier = SceneNode::group("Central Chandelier").with_child(
        SceneNode::mesh(
            "Chandelier Ring",
            generate_torus(3.0, 0.1, 16, 100).into_mesh(),
            gold(1.0, 0.1),
        )
        .with_rotation(PI / 2.0, 0.0, 0.0),
    );

    for i in 0..crystals {
        let angle = i as f32 / crystals as f32 * PI * 2.0;
        let drop = -0.5 - rng.random::<f32>() * 0.5;
        chandelier.add_child(crystal().with_position(angle.cos() * 3.0, drop, angle.sin() * 3.0));
    }

    chandelier.with_child(SceneNode::light(
        "Chandelier Light",
        Light::point(WARM_WHITE, 1.0, 20.0),
    ))
}

pub fn pedestal() -> SceneNode {
    SceneNode::mesh(
        "Pedestal",
        generate_box(1.0, 0.5, 1.0).into_mesh(),
        gold(0.7, 0.2),
    )
}

/// Small hanging lamp body with a light just below it
pub fn hanging_chandelier() -> SceneNode {
    SceneNode::group("Hanging Chandelier")
        .with_child(SceneNode::mesh(
            "Chandelier Body",
            generate_cylinder(0.2, 0.2, 0.5, 8, false).into_mesh(),
            gold(1.0, 0.2),
        ))
        .with_child(
            SceneNode::light("Chandelier Light", Light::point(WARM_WHITE, 0.8, 10.0))
                .with_position(0.0, -0.5, 0.0),
        )
}

/// Point cloud node from positions and per-point colours
pub fn particle_field(name: &str, points: Vec<Vertex3D>, material: Material) -> SceneNode {
    SceneNode::mesh(name, Mesh::points(points), material)
}

/// Unlit material for point clouds
pub fn particle_material(name: &str, hex: u32, opacity: f32, blend: BlendMode) -> Material {
    Material::unlit(name, [1.0; 3])
        .with_hex(hex)
        .with_opacity(opacity)
        .with_blend(blend)
}

/// Straight line of `points` vertices starting at `origin`, one unit apart
pub fn shooting_star_trail(origin: Vector3<f32>, direction: Vector3<f32>, points: usize) -> SceneNode {
    let vertices = (0..points)
        .map(|k| {
            let p = origin + direction * k as f32;
            Vertex3D::point([p.x, p.y, p.z], [1.0; 3])
        })
        .collect();
    SceneNode::mesh(
        "Shooting Star",
        Mesh::line_strip(vertices),
        Material::unlit("Shooting Star", [1.0; 3]).without_fog(),
    )
}

/// HSL to RGB, all components in `[0, 1]`
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l; 3];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_frame_has_border_and_four_corners() {
        let frame = luxury_frame();
        assert_eq!(frame.children().len(), 5);
        assert_eq!(frame.subtree_len(), 6);
    }

    #[test]
    fn test_desk_parts() {
        let desk = luxury_desk(Vector3::new(12.0, 0.0, 0.0));
        let lights = desk.children().iter().filter(|c| c.light_ref().is_some()).count();
        let meshes = desk.children().iter().filter(|c| c.mesh_ref().is_some()).count();
        assert_eq!(lights, 1);
        // top, case, four legs, two trims
        assert_eq!(meshes, 8);
    }

    #[test]
    fn test_crystals_hang_below_the_ring() {
        let mut rng = StdRng::seed_from_u64(7);
        let chandelier = central_chandelier(&mut rng, 20);
        let crystals: Vec<_> = chandelier
            .children()
            .iter()
            .filter(|c| c.name == "Crystal")
            .collect();
        assert_eq!(crystals.len(), 20);
        for c in crystals {
            let y = c.transform.position.y;
            assert!((-1.0..=-0.5).contains(&y));
        }
    }

    #[test]
    fn test_trail_is_a_unit_spaced_line() {
        let trail = shooting_star_trail(Vector3::new(1.0, 2.0, 3.0), Vector3::unit_x(), 20);
        let mesh = trail.mesh_ref().unwrap();
        assert_eq!(mesh.vertices().len(), 20);
        assert_eq!(mesh.vertices()[19].position, [20.0, 2.0, 3.0]);
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);
        let grey = hsl_to_rgb(0.3, 0.0, 0.25);
        assert_eq!(grey, [0.25; 3]);
    }
}
