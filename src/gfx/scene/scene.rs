use wgpu::Device;

use crate::{
    error::SceneError,
    gfx::resources::material::{Material, MaterialManager},
    wgpu_utils::BindGroupLayoutWithDesc,
};

use super::{
    light::{AmbientLight, PointLight},
    object::{Object, ObjectId},
    obstacles::ObstacleSet,
};

/// Main scene containing objects, lights, materials and the obstacle set
#[derive(Default)]
pub struct Scene {
    objects: Vec<Object>,
    obstacles: ObstacleSet,
    pub ambient: AmbientLight,
    pub point_lights: Vec<PointLight>,
    pub material_manager: MaterialManager,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its id. Ids are never reused.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len());
        log::trace!("added '{}' as {id:?}", object.name);
        self.objects.push(object);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.0)
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Marks an already added object as something that can block the camera.
    pub fn register_obstacle(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let object = self.objects.get(id.0).ok_or(SceneError::UnknownObject(id))?;
        self.obstacles.register(id, object)
    }

    /// Freezes the obstacle set; later registrations fail.
    pub fn seal_obstacles(&mut self) {
        self.obstacles.seal();
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn add_material(&mut self, material: Material) {
        self.material_manager.add_material(material);
    }

    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    pub fn set_ambient(&mut self, ambient: AmbientLight) {
        self.ambient = ambient;
    }

    /// Returns the material assigned to the object, or the default material
    /// if the assigned one doesn't exist.
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(&object.material)
    }

    /// Initializes GPU resources for all objects and materials
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        object_layout: &wgpu::BindGroupLayout,
        material_layout: &BindGroupLayoutWithDesc,
    ) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device, object_layout);
        }

        self.material_manager
            .update_all_gpu_resources(device, queue, material_layout);
    }

    /// Uploads the model matrix of every object moved since the last upload.
    pub fn update_transforms(&mut self, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut().filter(|o| o.transform_dirty()) {
            object.update_transform(queue);
        }
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.objects.len(),
            obstacle_count: self.obstacles.len(),
            material_count: self.material_manager.count(),
            point_light_count: self.point_lights.len(),
            total_triangles: self.objects.iter().map(Object::triangle_count).sum(),
            total_vertices: self.objects.iter().map(Object::vertex_count).sum(),
        }
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub obstacle_count: usize,
    pub material_count: usize,
    pub point_light_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        geometry::generate_box,
        scene::{Mesh, ObjectRole},
    };

    fn wall(name: &str) -> Object {
        let mesh = Mesh::from_geometry(&generate_box(1.0, 10.0, 5.0));
        Object::new(name, vec![mesh], ObjectRole::Obstacle)
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add_object(wall("a"));
        let b = scene.add_object(wall("b"));

        assert_eq!((a, b), (ObjectId(0), ObjectId(1)));
        assert_eq!(scene.object(b).map(|o| o.name.as_str()), Some("b"));
        assert!(scene.object(ObjectId(2)).is_none());
    }

    #[test]
    fn registering_unknown_object_fails() {
        let mut scene = Scene::new();
        assert_eq!(
            scene.register_obstacle(ObjectId(3)),
            Err(SceneError::UnknownObject(ObjectId(3)))
        );
    }

    #[test]
    fn sealed_scene_rejects_new_obstacles() {
        let mut scene = Scene::new();
        let first = scene.add_object(wall("first"));
        scene.register_obstacle(first).unwrap();
        scene.seal_obstacles();

        let late = scene.add_object(wall("late"));
        assert_eq!(scene.register_obstacle(late), Err(SceneError::ObstaclesSealed));
        assert_eq!(scene.obstacles().as_slice(), &[first]);
    }

    #[test]
    fn statistics_count_everything() {
        let mut scene = Scene::new();
        let id = scene.add_object(wall("w"));
        scene.register_obstacle(id).unwrap();
        scene.add_material(Material::lambert("wall", [1.0, 0.0, 0.0]));

        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 1);
        assert_eq!(stats.obstacle_count, 1);
        assert_eq!(stats.material_count, 2);
        assert_eq!(stats.total_triangles, 12);
        assert_eq!(stats.total_vertices, 24);
    }

    #[test]
    fn unassigned_material_resolves_to_default() {
        let mut scene = Scene::new();
        let id = scene.add_object(wall("w").with_material("nope"));
        let object = scene.object(id).unwrap();
        assert_eq!(scene.get_material_for_object(object).name, "default");
    }
}
