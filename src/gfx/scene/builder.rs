//! Assembles the static level: ground, avatar capsule, walls and lights.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Matrix4, Rad, Vector3};

use super::{
    light::{AmbientLight, PointLight},
    object::{Mesh, Object, ObjectId, ObjectRole},
    scene::Scene,
};
use crate::{
    config::{CapsuleSpec, SceneLayout, WallPlacement, WallSpec},
    error::SceneError,
    gfx::{
        geometry::{generate_box, generate_cylinder, generate_plane, generate_sphere_segment},
        resources::material::Material,
    },
};

pub const GROUND_MATERIAL: &str = "ground";
pub const AVATAR_MATERIAL: &str = "avatar";
pub const WALL_MATERIAL: &str = "wall";

/// A constructed scene and the ids of its well-known objects.
pub struct BuiltScene {
    pub scene: Scene,
    pub avatar: ObjectId,
    pub ground: ObjectId,
    /// In layout order; identical to the scene's obstacle set.
    pub walls: Vec<ObjectId>,
}

pub struct SceneBuilder<'a> {
    layout: &'a SceneLayout,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(layout: &'a SceneLayout) -> Self {
        Self { layout }
    }

    /// Builds every object, registers the walls as obstacles and seals the set.
    pub fn build(&self) -> Result<BuiltScene, SceneError> {
        let layout = self.layout;
        let mut scene = Scene::new();

        scene.add_material(
            Material::lambert(GROUND_MATERIAL, layout.ground_color).with_double_sided(true),
        );
        scene.add_material(Material::normal(AVATAR_MATERIAL));
        scene.add_material(Material::lambert(WALL_MATERIAL, layout.wall.color));

        let ground = scene.add_object(ground(layout.ground_size));
        let avatar = scene.add_object(capsule(&layout.capsule));

        let mut walls = Vec::with_capacity(layout.walls.len());
        for (index, placement) in layout.walls.iter().enumerate() {
            let id = scene.add_object(wall(index, &layout.wall, placement));
            scene.register_obstacle(id)?;
            walls.push(id);
        }
        scene.seal_obstacles();

        scene.set_ambient(AmbientLight::new(layout.ambient.color, layout.ambient.intensity));
        for light in &layout.point_lights {
            scene.add_point_light(PointLight::new(light.position, light.color, light.intensity));
        }

        let stats = scene.get_statistics();
        log::info!(
            "scene built: {} objects ({} obstacles), {} point lights, {} triangles",
            stats.object_count,
            stats.obstacle_count,
            stats.point_light_count,
            stats.total_triangles
        );

        Ok(BuiltScene {
            scene,
            avatar,
            ground,
            walls,
        })
    }
}

/// Square plane laid flat by a quarter turn about X.
fn ground(size: f32) -> Object {
    let mesh = Mesh::from_geometry(&generate_plane(size, size, 1, 1));
    Object::new("ground", vec![mesh], ObjectRole::Ground)
        .with_material(GROUND_MATERIAL)
        .with_transform(Matrix4::from_angle_x(Rad(FRAC_PI_2)))
}

/// Cylinder body with a hemisphere on each end, moved as one rigid group.
fn capsule(shape: &CapsuleSpec) -> Object {
    let half = shape.cylinder_height / 2.0;
    let segments = shape.radial_segments;

    let body = generate_cylinder(shape.radius, shape.cylinder_height, segments);
    let top = generate_sphere_segment(shape.radius, segments, segments, 0.0, FRAC_PI_2)
        .translated(Vector3::new(0.0, half, 0.0));
    let bottom = generate_sphere_segment(shape.radius, segments, segments, FRAC_PI_2, FRAC_PI_2)
        .translated(Vector3::new(0.0, -half, 0.0));

    let meshes = [body, top, bottom]
        .iter()
        .map(Mesh::from_geometry)
        .collect();

    Object::new("capsule", meshes, ObjectRole::Avatar)
        .with_material(AVATAR_MATERIAL)
        .with_transform(Matrix4::from_translation(shape.position))
}

/// Box standing on the ground, optionally turned about the vertical axis.
fn wall(index: usize, shape: &WallSpec, placement: &WallPlacement) -> Object {
    let mesh = Mesh::from_geometry(&generate_box(shape.width, shape.height, shape.depth));
    let transform = Matrix4::from_translation(Vector3::new(
        placement.x,
        shape.height / 2.0,
        placement.z,
    )) * Matrix4::from_angle_y(placement.rotation_y);

    Object::new(format!("wall_{index}"), vec![mesh], ObjectRole::Obstacle)
        .with_material(WALL_MATERIAL)
        .with_transform(transform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_default() -> BuiltScene {
        SceneBuilder::new(&SceneLayout::default()).build().unwrap()
    }

    #[test]
    fn every_wall_is_an_obstacle_and_in_the_scene() {
        let layout = SceneLayout::default();
        let built = SceneBuilder::new(&layout).build().unwrap();

        assert_eq!(built.walls.len(), layout.walls.len());
        assert_eq!(built.scene.obstacles().as_slice(), built.walls.as_slice());
        for id in &built.walls {
            let object = built.scene.object(*id).unwrap();
            assert_eq!(object.role, ObjectRole::Obstacle);
        }
    }

    #[test]
    fn ground_and_avatar_are_not_obstacles() {
        let built = build_default();
        assert!(!built.scene.obstacles().contains(built.ground));
        assert!(!built.scene.obstacles().contains(built.avatar));
        assert!(built.scene.obstacles().is_sealed());
    }

    #[test]
    fn wall_count_follows_layout() {
        let mut layout = SceneLayout::default();
        layout.walls.truncate(5);
        let built = SceneBuilder::new(&layout).build().unwrap();
        assert_eq!(built.scene.obstacles().len(), 5);
        assert_eq!(built.scene.objects().len(), 7);
    }

    #[test]
    fn walls_stand_on_the_ground() {
        let built = build_default();
        for id in &built.walls {
            let bounds = built.scene.object(*id).unwrap().world_bounds().unwrap();
            assert!(bounds.min.y.abs() < 1e-4);
            assert!((bounds.max.y - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn rotated_wall_spans_x() {
        let built = build_default();
        // (1, -17) is the first quarter-turned wall in the default layout.
        let bounds = built.scene.object(built.walls[6]).unwrap().world_bounds().unwrap();
        assert!((bounds.min.x - -1.5).abs() < 1e-4);
        assert!((bounds.max.x - 3.5).abs() < 1e-4);
        assert!((bounds.max.z - -16.5).abs() < 1e-4);
    }

    #[test]
    fn capsule_is_one_group_at_its_position() {
        let built = build_default();
        let capsule = built.scene.object(built.avatar).unwrap();
        assert_eq!(capsule.meshes.len(), 3);
        assert_eq!(capsule.position(), Vector3::new(0.0, 2.0, 0.0));

        let bounds = capsule.world_bounds().unwrap();
        assert!(bounds.min.y.abs() < 1e-4);
        assert!((bounds.max.y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn ground_lies_flat() {
        let built = build_default();
        let bounds = built.scene.object(built.ground).unwrap().world_bounds().unwrap();
        assert!(bounds.min.y.abs() < 1e-4 && bounds.max.y.abs() < 1e-4);
        assert!((bounds.max.x - 25.0).abs() < 1e-4);
        assert!((bounds.max.z - 25.0).abs() < 1e-4);
    }

    #[test]
    fn lights_and_materials_are_installed() {
        let built = build_default();
        assert_eq!(built.scene.point_lights.len(), 3);
        assert_eq!(built.scene.ambient.intensity, 0.5);
        assert!(built.scene.material_manager.get_material(GROUND_MATERIAL).unwrap().double_sided);
        assert!(!built.scene.material_manager.get_material(WALL_MATERIAL).unwrap().double_sided);
    }
}
