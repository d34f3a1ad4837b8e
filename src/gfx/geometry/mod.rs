//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes the scene is assembled from, so no model files
//! are needed. All generators are Y-up.
//!
//! ## Supported Primitives
//!
//! - **Plane**: flat rectangle in the XY plane (rotate it to lay it down)
//! - **Box**: axis-aligned box with per-face normals
//! - **Cylinder**: capped cylinder along +Y
//! - **Sphere segment**: latitude band of a sphere; hemispheres are the common case
//!
//! ## Usage
//!
//! ```rust
//! use obstacle_cam::gfx::geometry::{generate_box, generate_sphere_segment};
//!
//! let wall = generate_box(1.0, 10.0, 5.0);
//! let dome = generate_sphere_segment(1.0, 32, 32, 0.0, std::f32::consts::FRAC_PI_2);
//! assert_eq!(wall.triangle_count(), 12);
//! assert!(dome.vertex_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::Vector3;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
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

    /// Returns a copy with every vertex shifted by `offset`.
    ///
    /// Used to bake a part's position inside a rigid group (the capsule caps)
    /// into its vertices so the whole group shares one object transform.
    pub fn translated(mut self, offset: Vector3<f32>) -> Self {
        for vertex in &mut self.vertices {
            vertex[0] += offset.x;
            vertex[1] += offset.y;
            vertex[2] += offset.z;
        }
        self
    }

    /// Convert to the vertex format used by the renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translated_moves_every_vertex() {
        let plane = generate_plane(2.0, 2.0, 1, 1).translated(Vector3::new(0.0, 3.0, 0.0));
        assert!(plane.vertices.iter().all(|v| v[1] == 2.0 || v[1] == 4.0));
        assert_eq!(plane.vertices[0], [-1.0, 2.0, 0.0]);
    }

    #[test]
    fn scene_format_keeps_normals() {
        let cube = generate_box(1.0, 1.0, 1.0);
        let (vertices, indices) = cube.to_scene_format();
        assert_eq!(vertices.len(), cube.vertex_count());
        assert_eq!(indices.len(), 36);
        assert_eq!(vertices[0].normal, cube.normals[0]);
    }
}
