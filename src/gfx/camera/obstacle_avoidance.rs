//! Keeps walls from hiding the avatar.
//!
//! Every frame a ray is cast from the avatar back towards the camera. If an
//! obstacle lies on it, the camera is pulled in quickly to the hit distance plus
//! a small clearance; otherwise it eases back out to its resting distance.

use cgmath::{InnerSpace, Vector3, VectorSpace};

use super::orbit_camera::OrbitCamera;
use crate::{
    config::AvoidanceConfig,
    gfx::{
        raycast::{Ray, Raycaster},
        scene::{ObjectId, Scene},
    },
};

/// What the last avoidance step found between avatar and camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvoidanceOutcome {
    Occluded { object: ObjectId, distance: f32 },
    Clear,
}

impl AvoidanceOutcome {
    pub fn is_occluded(&self) -> bool {
        matches!(self, AvoidanceOutcome::Occluded { .. })
    }
}

pub struct ObstacleAvoidance {
    config: AvoidanceConfig,
    rest_distance: f32,
    last: AvoidanceOutcome,
}

impl ObstacleAvoidance {
    /// The resting distance is fixed from the initial camera and avatar positions.
    pub fn new(config: AvoidanceConfig, eye: Vector3<f32>, avatar: Vector3<f32>) -> Self {
        Self {
            config,
            rest_distance: (eye - avatar).magnitude(),
            last: AvoidanceOutcome::Clear,
        }
    }

    pub fn rest_distance(&self) -> f32 {
        self.rest_distance
    }

    pub fn last_outcome(&self) -> AvoidanceOutcome {
        self.last
    }

    /// Moves `camera.eye` one blend step towards its desired position along
    /// the avatar-to-camera line.
    pub fn step(
        &mut self,
        avatar: Vector3<f32>,
        camera: &mut OrbitCamera,
        scene: &Scene,
    ) -> AvoidanceOutcome {
        // `forward` is always unit length, so the ray always exists.
        let direction = -camera.forward();
        let far = (camera.eye - avatar).magnitude();

        let hit = Ray::new(avatar, direction).and_then(|ray| {
            Raycaster::new(ray, 0.0, far).nearest(scene, scene.obstacles().iter())
        });

        let (desired, blend, outcome) = match hit {
            Some(hit) => (
                avatar + direction * (hit.distance + self.config.clearance),
                self.config.occluded_blend,
                AvoidanceOutcome::Occluded {
                    object: hit.object,
                    distance: hit.distance,
                },
            ),
            None => (
                avatar + direction * self.rest_distance,
                self.config.clear_blend,
                AvoidanceOutcome::Clear,
            ),
        };

        camera.eye = camera.eye.lerp(desired, blend);

        if outcome.is_occluded() != self.last.is_occluded() {
            match outcome {
                AvoidanceOutcome::Occluded { object, distance } => {
                    log::debug!("view blocked by {object:?} at {distance:.2}")
                }
                AvoidanceOutcome::Clear => log::debug!("view clear"),
            }
        }
        self.last = outcome;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        geometry::generate_box,
        scene::{Mesh, Object, ObjectRole},
    };
    use cgmath::Matrix4;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn avatar() -> Vector3<f32> {
        Vector3::new(0.0, 2.0, 0.0)
    }

    fn scene_with_walls(positions: &[Vector3<f32>]) -> Scene {
        let mut scene = Scene::new();
        for (i, at) in positions.iter().enumerate() {
            let mesh = Mesh::from_geometry(&generate_box(4.0, 10.0, 1.0));
            let id = scene.add_object(
                Object::new(format!("wall_{i}"), vec![mesh], ObjectRole::Obstacle)
                    .with_transform(Matrix4::from_translation(*at)),
            );
            scene.register_obstacle(id).unwrap();
        }
        scene.seal_obstacles();
        scene
    }

    fn default_rig() -> (ObstacleAvoidance, OrbitCamera) {
        let eye = Vector3::new(0.0, 4.0, 10.0);
        let avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), eye, avatar());
        (avoidance, OrbitCamera::new(eye, avatar(), 1.5))
    }

    fn close(a: Vector3<f32>, b: Vector3<f32>, tolerance: f32) -> bool {
        (a - b).magnitude() < tolerance
    }

    #[test]
    fn rest_distance_comes_from_initial_positions() {
        let (avoidance, _) = default_rig();
        assert!((avoidance.rest_distance() - 104f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn camera_at_rest_without_obstacles_stays_put() {
        let scene = Scene::new();
        let (mut avoidance, mut camera) = default_rig();
        let before = camera.eye;

        assert_eq!(avoidance.step(avatar(), &mut camera, &scene), AvoidanceOutcome::Clear);
        assert!(close(camera.eye, before, 1e-4));
    }

    #[test]
    fn occluded_camera_is_pulled_towards_the_wall() {
        // Wall front face at z = 4.5 on the avatar-to-camera line (0, 2, 0) -> (0, 2, 10).
        let scene = scene_with_walls(&[Vector3::new(0.0, 5.0, 5.0)]);
        let eye = Vector3::new(0.0, 2.0, 10.0);
        let mut avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), eye, avatar());
        let mut camera = OrbitCamera::new(eye, avatar(), 1.5);

        let outcome = avoidance.step(avatar(), &mut camera, &scene);
        let AvoidanceOutcome::Occluded { distance, .. } = outcome else {
            panic!("expected an occluded outcome, got {outcome:?}");
        };
        assert!((distance - 4.5).abs() < 1e-4);

        // desired = avatar + dir * (4.5 + 0.5), blended by 0.4
        let desired = Vector3::new(0.0, 2.0, 5.0);
        assert!(close(camera.eye, eye.lerp(desired, 0.4), 1e-4));
    }

    #[test]
    fn repeated_steps_settle_at_hit_plus_clearance() {
        let scene = scene_with_walls(&[Vector3::new(0.0, 5.0, 5.0)]);
        let eye = Vector3::new(0.0, 2.0, 10.0);
        let mut avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), eye, avatar());
        let mut camera = OrbitCamera::new(eye, avatar(), 1.5);

        for _ in 0..100 {
            assert!(avoidance.step(avatar(), &mut camera, &scene).is_occluded());
        }
        let distance = camera.distance_to_target();
        assert!((distance - 5.0).abs() < 1e-3, "camera at {distance}");
    }

    #[test]
    fn obstacle_behind_camera_is_ignored() {
        let scene = scene_with_walls(&[Vector3::new(0.0, 5.0, 20.0)]);
        let (mut avoidance, mut camera) = default_rig();
        assert_eq!(avoidance.step(avatar(), &mut camera, &scene), AvoidanceOutcome::Clear);
    }

    #[test]
    fn unregistered_geometry_never_occludes() {
        let mut scene = Scene::new();
        let mesh = Mesh::from_geometry(&generate_box(4.0, 10.0, 1.0));
        scene.add_object(
            Object::new("prop", vec![mesh], ObjectRole::Prop)
                .with_transform(Matrix4::from_translation(Vector3::new(0.0, 5.0, 5.0))),
        );
        let eye = Vector3::new(0.0, 2.0, 10.0);
        let mut avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), eye, avatar());
        let mut camera = OrbitCamera::new(eye, avatar(), 1.5);
        assert_eq!(avoidance.step(avatar(), &mut camera, &scene), AvoidanceOutcome::Clear);
    }

    #[test]
    fn obstacle_without_geometry_falls_through_to_clear() {
        let mut scene = Scene::new();
        let id = scene.add_object(
            Object::new("empty", Vec::new(), ObjectRole::Obstacle)
                .with_transform(Matrix4::from_translation(Vector3::new(0.0, 2.0, 5.0))),
        );
        scene.register_obstacle(id).unwrap();
        scene.seal_obstacles();

        let eye = Vector3::new(0.0, 2.0, 10.0);
        let mut avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), eye, avatar());
        let mut camera = OrbitCamera::new(eye, avatar(), 1.5);

        assert_eq!(avoidance.step(avatar(), &mut camera, &scene), AvoidanceOutcome::Clear);
        assert!(close(camera.eye, eye, 1e-4));
    }

    #[test]
    fn last_outcome_tracks_the_latest_step() {
        let scene = scene_with_walls(&[Vector3::new(0.0, 5.0, 5.0)]);
        let eye = Vector3::new(0.0, 2.0, 10.0);
        let mut avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), eye, avatar());
        let mut camera = OrbitCamera::new(eye, avatar(), 1.5);
        assert_eq!(avoidance.last_outcome(), AvoidanceOutcome::Clear);

        let outcome = avoidance.step(avatar(), &mut camera, &scene);
        assert!(outcome.is_occluded());
        assert_eq!(avoidance.last_outcome(), outcome);

        let open = Scene::new();
        avoidance.step(avatar(), &mut camera, &open);
        assert_eq!(avoidance.last_outcome(), AvoidanceOutcome::Clear);
    }

    #[test]
    fn camera_on_the_avatar_stays_finite() {
        let scene = Scene::new();
        let mut avoidance = ObstacleAvoidance::new(
            AvoidanceConfig::default(),
            Vector3::new(0.0, 4.0, 10.0),
            avatar(),
        );
        let mut camera = OrbitCamera::new(avatar(), avatar(), 1.5);

        avoidance.step(avatar(), &mut camera, &scene);
        assert!(camera.eye.x.is_finite() && camera.eye.y.is_finite() && camera.eye.z.is_finite());
        // Falls back to backing out along +Z.
        let expected = avatar() + Vector3::unit_z() * avoidance.rest_distance() * 0.08;
        assert!(close(camera.eye, expected, 1e-4));
    }

    #[test]
    fn unobstructed_camera_converges_to_rest_distance() {
        let scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(0x0b57ac1e);

        for _ in 0..50 {
            let avatar = Vector3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(0.0..4.0),
                rng.random_range(-10.0..10.0),
            );
            let initial = avatar
                + Vector3::new(
                    rng.random_range(-8.0..8.0),
                    rng.random_range(0.5..8.0),
                    rng.random_range(-8.0..8.0),
                );
            let start = avatar
                + Vector3::new(
                    rng.random_range(-20.0..20.0),
                    rng.random_range(0.1..20.0),
                    rng.random_range(-20.0..20.0),
                );

            let mut avoidance = ObstacleAvoidance::new(AvoidanceConfig::default(), initial, avatar);
            let mut camera = OrbitCamera::new(start, avatar, 1.5);
            let direction = -camera.forward();
            let expected = avatar + direction * avoidance.rest_distance();

            let mut gap = (camera.eye - expected).magnitude();
            for _ in 0..400 {
                assert_eq!(avoidance.step(avatar, &mut camera, &scene), AvoidanceOutcome::Clear);
                let next = (camera.eye - expected).magnitude();
                // Each step covers 8% of the remaining gap along the same line.
                assert!(next <= gap * 0.92 + 1e-4, "gap grew from {gap} to {next}");
                gap = next;
            }

            assert!(
                close(camera.eye, expected, 1e-3),
                "eye {:?} expected {:?}",
                camera.eye,
                expected
            );
        }
    }
}
