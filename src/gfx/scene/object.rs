use cgmath::{Matrix4, SquareMatrix, Vector3};
use wgpu::Device;

use super::vertex::Vertex3D;
use crate::gfx::{geometry::GeometryData, raycast::Aabb, resources::material::MaterialId};

/// Index of an object inside its [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// What part an object plays in the scene.
///
/// Ground and avatar geometry must never be raycast against when looking for
/// occluders, so the obstacle set refuses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRole {
    Ground,
    Avatar,
    Obstacle,
    Prop,
}

impl ObjectRole {
    /// Whether objects with this role may be registered as occluders.
    pub fn can_occlude(self) -> bool {
        matches!(self, ObjectRole::Obstacle | ObjectRole::Prop)
    }
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(vertices, indices)
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn init_gpu_resources(&mut self, device: &Device, label: &str) {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
    }
}

/// Per-object uniform resources
pub struct ObjectGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A renderable object: one or more meshes moved together by a single transform.
///
/// Multi-mesh objects are rigid groups; part offsets are baked into the mesh
/// vertices (see [`GeometryData::translated`]).
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub role: ObjectRole,
    pub material: MaterialId,
    pub visible: bool,
    transform: Matrix4<f32>,
    inverse_transform: Option<Matrix4<f32>>,
    transform_dirty: bool,
    local_bounds: Option<Aabb>,
    gpu_resources: Option<ObjectGpuResources>,
}

impl Object {
    /// Create a new Object with identity transformation
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>, role: ObjectRole) -> Self {
        let positions: Vec<[f32; 3]> = meshes
            .iter()
            .flat_map(|mesh| mesh.vertices().iter().map(|v| v.position))
            .collect();

        Self {
            name: name.into(),
            meshes,
            role,
            material: MaterialId::from("default"),
            visible: true,
            transform: Matrix4::identity(),
            inverse_transform: Some(Matrix4::identity()),
            transform_dirty: false,
            local_bounds: Aabb::from_points(&positions),
            gpu_resources: None,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.set_transform(transform);
        self
    }

    pub fn with_material(mut self, material: &str) -> Self {
        self.material = material.to_string();
        self
    }

    /// Replaces the world transform. The cached inverse used by raycasts is
    /// refreshed here, so this is the only way the transform changes. The GPU
    /// copy follows on the next [`Object::update_transform`].
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
        self.inverse_transform = transform.invert();
        self.transform_dirty = true;
    }

    /// Whether the model matrix changed since it was last uploaded
    pub fn transform_dirty(&self) -> bool {
        self.transform_dirty
    }

    /// Writes a changed model matrix to the GPU. No-op before upload or when
    /// nothing changed.
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        if !self.transform_dirty {
            return;
        }
        let Some(gpu_resources) = &self.gpu_resources else {
            return;
        };

        let transform_data: &[f32; 16] = self.transform.as_ref();
        queue.write_buffer(
            &gpu_resources.transform_buffer,
            0,
            bytemuck::cast_slice(transform_data),
        );
        self.transform_dirty = false;
    }

    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    /// `None` when the transform is singular (e.g. zero scale).
    pub fn inverse_transform(&self) -> Option<Matrix4<f32>> {
        self.inverse_transform
    }

    /// World-space translation of the object's origin
    pub fn position(&self) -> Vector3<f32> {
        self.transform.w.truncate()
    }

    /// Bounds of all meshes in object space; `None` for an object without vertices
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.local_bounds
    }

    /// Conservative world-space bounds
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.local_bounds
            .map(|bounds| bounds.transform(&self.transform))
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.index_count() / 3).sum()
    }

    pub fn vertex_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.vertex_count()).sum()
    }

    /// Get the transform bind group for rendering
    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }

    /// Uploads mesh buffers and the model matrix.
    ///
    /// `layout` is the renderer's per-object layout (group 1).
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device, &self.name);
        }

        // cgmath matrices are already column-major for GPU
        let transform_data: &[f32; 16] = self.transform.as_ref();

        let transform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Transform Buffer", self.name)),
                contents: bytemuck::cast_slice(transform_data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Transform Bind Group", self.name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
        self.transform_dirty = false;
    }
}

pub trait DrawObject {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_object(&mut self, object: &Object);
}

impl DrawObject for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Not uploaded yet
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_object(&mut self, object: &Object) {
        let Some(transform_bind_group) = object.get_transform_bind_group() else {
            return;
        };

        self.set_bind_group(1, transform_bind_group, &[]);
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_box, generate_sphere_segment};
    use cgmath::Rad;

    #[test]
    fn bounds_cover_every_mesh_in_a_group() {
        let body = Mesh::from_geometry(&generate_box(2.0, 2.0, 2.0));
        let cap = Mesh::from_geometry(
            &generate_sphere_segment(1.0, 8, 4, 0.0, std::f32::consts::FRAC_PI_2)
                .translated(Vector3::new(0.0, 1.0, 0.0)),
        );
        let object = Object::new("capsule", vec![body, cap], ObjectRole::Avatar);

        let bounds = object.local_bounds().unwrap();
        assert_eq!(bounds.min.y, -1.0);
        assert!((bounds.max.y - 2.0).abs() < 1e-6);
        assert_eq!(object.triangle_count(), 12 + object.meshes[1].index_count() / 3);
    }

    #[test]
    fn transform_keeps_inverse_and_position_in_sync() {
        let mesh = Mesh::from_geometry(&generate_box(1.0, 10.0, 5.0));
        let object = Object::new("wall", vec![mesh], ObjectRole::Obstacle).with_transform(
            Matrix4::from_translation(Vector3::new(4.0, 5.0, -2.0))
                * Matrix4::from_angle_y(Rad(0.3)),
        );

        assert_eq!(object.position(), Vector3::new(4.0, 5.0, -2.0));
        let round_trip = object.transform() * object.inverse_transform().unwrap();
        assert!((round_trip.x.x - 1.0).abs() < 1e-5);
        assert!(round_trip.w.truncate().x.abs() < 1e-5);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let object = Object::new("flat", vec![], ObjectRole::Prop)
            .with_transform(Matrix4::from_scale(0.0));
        assert!(object.inverse_transform().is_none());
        assert!(object.local_bounds().is_none());
        assert!(object.world_bounds().is_none());
    }

    #[test]
    fn moving_an_object_marks_its_transform_for_upload() {
        let mut object = Object::new("capsule", vec![], ObjectRole::Avatar);
        assert!(!object.transform_dirty());

        object.set_transform(Matrix4::from_translation(Vector3::new(3.0, 2.0, 0.0)));
        assert!(object.transform_dirty());
        assert_eq!(object.position(), Vector3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn ground_and_avatar_cannot_occlude() {
        assert!(!ObjectRole::Ground.can_occlude());
        assert!(!ObjectRole::Avatar.can_occlude());
        assert!(ObjectRole::Obstacle.can_occlude());
    }
}
