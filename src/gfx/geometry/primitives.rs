//! # Primitive Shape Generation
//!
//! This module contains functions to generate common 3D primitive shapes.
//! All shapes are generated with proper normals and texture coordinates.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has proper normals pointing outward and UV coordinates from 0 to 1.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.tex_coords = tex_coords.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    // Two triangles per face, counter-clockwise
    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}

/// Generate an axis-aligned box centered at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = generate_cube();
    for vertex in data.vertices.iter_mut() {
        vertex[0] *= width;
        vertex[1] *= height;
        vertex[2] *= depth;
    }
    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of segments around the Y axis
/// * `height_segments` - Number of segments from pole to pole
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    generate_sphere_section(radius, width_segments, height_segments, 0.0, 2.0 * PI, 0.0, PI)
}

/// Generate a partial UV sphere
///
/// `phi` sweeps around the Y axis, `theta` sweeps down from the north pole.
/// A `theta_length` of `PI / 2` produces an upper hemisphere (dome).
pub fn generate_sphere_section(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    phi_start: f32,
    phi_length: f32,
    theta_start: f32,
    theta_length: f32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = width_segments.max(3);
    let lat_segs = height_segments.max(2);

    for lat in 0..=lat_segs {
        let v = lat as f32 / lat_segs as f32;
        let theta = theta_start + v * theta_length;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let u = long as f32 / long_segs as f32;
            let phi = phi_start + u * phi_length;

            let x = -phi.cos() * sin_theta;
            let y = cos_theta;
            let z = phi.sin() * sin_theta;

            data.vertices.push([x * radius, y * radius, z * radius]);
            data.normals.push([x, y, z]);
            data.tex_coords.push([u, 1.0 - v]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a plane in the XY plane facing +Z
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            // Image rows run top to bottom
            data.tex_coords.push([u, 1.0 - v]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[next_row, i + 1, next_row + 1]);
        }
    }

    data
}

/// Generate a flat disc in the XY plane facing +Z
pub fn generate_circle(radius: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    data.vertices.push([0.0, 0.0, 0.0]);
    data.normals.push([0.0, 0.0, 1.0]);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..=segs {
        let angle = i as f32 / segs as f32 * 2.0 * PI;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * cos_a, radius * sin_a, 0.0]);
        data.normals.push([0.0, 0.0, 1.0]);
        data.tex_coords.push([(cos_a + 1.0) * 0.5, (sin_a + 1.0) * 0.5]);
    }

    for i in 1..=segs {
        data.indices.extend_from_slice(&[0, i, i + 1]);
    }

    data
}

/// Generate a cylinder (or truncated cone) along the Y axis
///
/// # Arguments
/// * `radius_top` - Radius at `+height/2`
/// * `radius_bottom` - Radius at `-height/2`
/// * `height` - Total height
/// * `segments` - Number of radial segments
/// * `open_ended` - Skip the end caps
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    segments: u32,
    open_ended: bool,
) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;
    // Slope of the side wall, folded into the normal
    let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);

    for i in 0..=segs {
        let u = i as f32 / segs as f32;
        let angle = u * 2.0 * PI;
        let (sin_a, cos_a) = angle.sin_cos();

        let normal = normalize([sin_a, slope, cos_a]);

        data.vertices
            .push([radius_bottom * sin_a, -half_height, radius_bottom * cos_a]);
        data.normals.push(normal);
        data.tex_coords.push([u, 0.0]);

        data.vertices
            .push([radius_top * sin_a, half_height, radius_top * cos_a]);
        data.normals.push(normal);
        data.tex_coords.push([u, 1.0]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = bottom_current + 2;
        let top_next = bottom_current + 3;

        data.indices
            .extend_from_slice(&[bottom_current, bottom_next, top_current]);
        data.indices
            .extend_from_slice(&[top_current, bottom_next, top_next]);
    }

    if !open_ended {
        if radius_top > 0.0 {
            add_cap(&mut data, radius_top, half_height, segs, true);
        }
        if radius_bottom > 0.0 {
            add_cap(&mut data, radius_bottom, -half_height, segs, false);
        }
    }

    data
}

/// Generate a cone along the Y axis with its tip at `+height/2`
pub fn generate_cone(radius: f32, height: f32, segments: u32) -> GeometryData {
    generate_cylinder(0.0, radius, height, segments, false)
}

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `radius` - Distance from the centre to the middle of the tube
/// * `tube` - Tube radius
/// * `radial_segments` - Segments around the tube
/// * `tubular_segments` - Segments around the ring
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * 2.0 * PI;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * 2.0 * PI;

            let x = (radius + tube * v.cos()) * u.cos();
            let y = (radius + tube * v.cos()) * u.sin();
            let z = tube * v.sin();

            let center = [radius * u.cos(), radius * u.sin(), 0.0];
            data.vertices.push([x, y, z]);
            data.normals
                .push(normalize([x - center[0], y - center[1], z - center[2]]));
            data.tex_coords
                .push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    for j in 1..=radial {
        for i in 1..=tubular {
            let a = (tubular + 1) * j + i - 1;
            let b = (tubular + 1) * (j - 1) + i - 1;
            let c = (tubular + 1) * (j - 1) + i;
            let d = (tubular + 1) * j + i;

            data.indices.extend_from_slice(&[a, b, d]);
            data.indices.extend_from_slice(&[b, c, d]);
        }
    }

    data
}

fn add_cap(data: &mut GeometryData, radius: f32, y: f32, segs: u32, top: bool) {
    let normal_y = if top { 1.0 } else { -1.0 };
    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, y, 0.0]);
    data.normals.push([0.0, normal_y, 0.0]);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..=segs {
        let angle = i as f32 / segs as f32 * 2.0 * PI;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * sin_a, y, radius * cos_a]);
        data.normals.push([0.0, normal_y, 0.0]);
        data.tex_coords.push([(sin_a + 1.0) * 0.5, (cos_a + 1.0) * 0.5]);
    }

    for i in 0..segs {
        let current = center + 1 + i;
        let next = current + 1;
        if top {
            data.indices.extend_from_slice(&[center, current, next]);
        } else {
            data.indices.extend_from_slice(&[center, next, current]);
        }
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        [0.0, 1.0, 0.0]
    }
}
