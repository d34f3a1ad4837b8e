//! # Primitive Shape Generation
//!
//! This module contains functions to generate common 3D primitive shapes.
//! All shapes are generated with per-vertex normals.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate an axis-aligned box centered at the origin
///
/// `width`, `height` and `depth` are the full extents along X, Y and Z.
/// Each face has its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-hx, -hy,  hz], [ hx, -hy,  hz], [ hx,  hy,  hz], [-hx,  hy,  hz],
        // Back face
        [-hx, -hy, -hz], [-hx,  hy, -hz], [ hx,  hy, -hz], [ hx, -hy, -hz],
        // Left face
        [-hx, -hy, -hz], [-hx, -hy,  hz], [-hx,  hy,  hz], [-hx,  hy, -hz],
        // Right face
        [ hx, -hy,  hz], [ hx, -hy, -hz], [ hx,  hy, -hz], [ hx,  hy,  hz],
        // Top face
        [-hx,  hy,  hz], [ hx,  hy,  hz], [ hx,  hy, -hz], [-hx,  hy, -hz],
        // Bottom face
        [-hx, -hy, -hz], [ hx, -hy, -hz], [ hx, -hy,  hz], [-hx, -hy,  hz],
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
    for normal in face_normals {
        data.normals.extend_from_slice(&[normal; 4]);
    }

    // Two counter-clockwise triangles per face
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a band of a sphere between two polar angles
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of segments around the Y axis
/// * `height_segments` - Number of segments from `theta_start` to `theta_start + theta_length`
/// * `theta_start` - Polar start angle measured from +Y
/// * `theta_length` - Polar sweep
///
/// A full sphere is `(0, PI)`, the upper hemisphere `(0, PI/2)` and the lower
/// hemisphere `(PI/2, PI/2)`. Degenerate triangles at the poles are skipped.
pub fn generate_sphere_segment(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    theta_start: f32,
    theta_length: f32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(3);
    let h_segs = height_segments.max(2);
    let theta_end = (theta_start + theta_length).min(PI);

    for iy in 0..=h_segs {
        let v = iy as f32 / h_segs as f32;
        let theta = theta_start + v * theta_length;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for ix in 0..=w_segs {
            let u = ix as f32 / w_segs as f32;
            let phi = u * 2.0 * PI;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = [-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            data.vertices
                .push([radius * normal[0], radius * normal[1], radius * normal[2]]);
            data.normals.push(normal);
        }
    }

    let row = w_segs + 1;
    for iy in 0..h_segs {
        for ix in 0..w_segs {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 || theta_start > 0.0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h_segs - 1 || theta_end < PI {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data
}

/// Generate a plane in the XY plane
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Returns a plane centered at the origin with its normal along +Z. Rotate it a
/// quarter turn about X to use it as a floor.
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

/// Generate a capped cylinder along the Y axis
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Height of the cylinder (along Y)
/// * `segments` - Number of circular segments
///
/// Returns a cylinder centered at the origin extending from -height/2 to height/2 in Y.
/// Cap vertices are separate from the side ring so both keep correct normals.
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;

    // Side ring: bottom/top pairs
    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let x = radius * cos_a;
        let z = radius * sin_a;

        data.vertices.push([x, -half_height, z]);
        data.normals.push([cos_a, 0.0, sin_a]);

        data.vertices.push([x, half_height, z]);
        data.normals.push([cos_a, 0.0, sin_a]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = (i + 1) * 2;
        let top_next = bottom_next + 1;

        data.indices
            .extend_from_slice(&[bottom_current, top_current, bottom_next]);
        data.indices
            .extend_from_slice(&[top_current, top_next, bottom_next]);
    }

    push_cap(&mut data, radius, half_height, segs, 1.0);
    push_cap(&mut data, radius, -half_height, segs, -1.0);

    data
}

/// Appends a triangle fan closing the cylinder at `y`, facing `facing` (+1 up, -1 down).
fn push_cap(data: &mut GeometryData, radius: f32, y: f32, segs: u32, facing: f32) {
    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, y, 0.0]);
    data.normals.push([0.0, facing, 0.0]);

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * cos_a, y, radius * sin_a]);
        data.normals.push([0.0, facing, 0.0]);
    }

    for i in 0..segs {
        let current = center + 1 + i;
        let next = current + 1;
        if facing > 0.0 {
            data.indices.extend_from_slice(&[center, next, current]);
        } else {
            data.indices.extend_from_slice(&[center, current, next]);
        }
    }
}
