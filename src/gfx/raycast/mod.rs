//! # Raycasting
//!
//! Ray queries against scene objects, used to find what stands between the
//! avatar and the camera.
//!
//! ## How it works
//!
//! 1. **Ray**: an origin plus a normalized direction, bounded by `near..=far`
//! 2. **Local-space test**: the ray is carried into each object's local frame and
//!    slab-tested against the object's mesh bounds, which is exact for boxes under
//!    any rigid transform
//! 3. **Ordering**: hits are sorted by distance; equal distances keep the order the
//!    objects were queried in
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector3;
//! use obstacle_cam::gfx::raycast::Ray;
//!
//! let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 4.0)).unwrap();
//! assert_eq!(ray.point_at(2.0), Vector3::new(0.0, 2.0, 2.0));
//! ```

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

use crate::gfx::scene::{Object, ObjectId, Scene};

/// Below this length a direction is treated as zero.
const MIN_DIRECTION_LENGTH: f32 = 1e-6;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`. Returns `None` for a zero direction.
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let length = direction.magnitude();
        if !length.is_finite() || length < MIN_DIRECTION_LENGTH {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / length,
        })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` when there are none.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let mut bounds = Self::new(Vector3::from(*first), Vector3::from(*first));
        for point in rest {
            bounds.expand(*point);
        }
        Some(bounds)
    }

    fn expand(&mut self, point: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Slab test. Returns the parametric `(t_near, t_far)` interval where the line
    /// `origin + t * direction` is inside the box, or `None` if it misses.
    ///
    /// `direction` need not be normalized; `t` is measured in its units. Axes
    /// the direction is parallel to are handled without dividing by zero.
    pub fn intersect_ray(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
    ) -> Option<(f32, f32)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }

    /// World-space bounds of this box after `matrix`, from its eight corners.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corner = |i: usize| {
            let local = Vector4::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0,
            );
            let world = matrix * local;
            [world.x / world.w, world.y / world.w, world.z / world.w]
        };

        let first = Vector3::from(corner(0));
        let mut bounds = Self::new(first, first);
        for i in 1..8 {
            bounds.expand(corner(i));
        }
        bounds
    }
}

/// One ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub object: ObjectId,
    /// World-space distance from the ray origin to the entry point.
    pub distance: f32,
    pub point: Vector3<f32>,
}

/// A bounded ray query, mirroring `(origin, direction, near, far)`.
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
}

impl Raycaster {
    pub fn new(ray: Ray, near: f32, far: f32) -> Self {
        Self { ray, near, far }
    }

    /// Entry distance of the ray into `object`, if it lies within `near..=far`.
    ///
    /// Only entries count: a ray that starts inside an object does not hit it.
    /// Objects without geometry are never hit.
    pub fn intersect_object(&self, object: &Object) -> Option<f32> {
        let bounds = object.local_bounds()?;
        let inverse = object.inverse_transform()?;

        // Affine transforms keep w = 1 for points and w = 0 for directions, and
        // the mapping is linear in t, so local t equals world distance.
        let local_origin = (inverse * self.ray.origin.extend(1.0)).truncate();
        let local_direction = (inverse * self.ray.direction.extend(0.0)).truncate();

        let (t_near, _) = bounds.intersect_ray(local_origin, local_direction)?;

        (t_near >= self.near && t_near <= self.far).then_some(t_near)
    }

    /// Tests every id in `ids` and returns the hits nearest first.
    ///
    /// The sort is stable, so hits at equal distance stay in `ids` order. Ids
    /// not present in `scene` are skipped.
    pub fn intersect_objects<I>(&self, scene: &Scene, ids: I) -> Vec<Intersection>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let mut hits: Vec<Intersection> = ids
            .into_iter()
            .filter_map(|id| {
                let object = scene.object(id)?;
                let distance = self.intersect_object(object)?;
                Some(Intersection {
                    object: id,
                    distance,
                    point: self.ray.point_at(distance),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest hit among `ids`, if any.
    pub fn nearest<I>(&self, scene: &Scene, ids: I) -> Option<Intersection>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        self.intersect_objects(scene, ids).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;
    use crate::gfx::scene::{Mesh, ObjectRole};
    use cgmath::Rad;
    use std::f32::consts::FRAC_PI_2;

    fn wall(scene: &mut Scene, name: &str, at: Vector3<f32>, rotation_y: f32) -> ObjectId {
        let mesh = Mesh::from_geometry(&generate_box(1.0, 10.0, 5.0));
        let object = Object::new(name, vec![mesh], ObjectRole::Obstacle)
            .with_transform(Matrix4::from_translation(at) * Matrix4::from_angle_y(Rad(rotation_y)));
        scene.add_object(object)
    }

    #[test]
    fn test_aabb_creation() {
        let aabb = Aabb::from_points(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]])
            .unwrap();
        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn object_without_geometry_is_never_hit() {
        let mut scene = Scene::new();
        let id = scene.add_object(
            Object::new("empty", Vec::new(), ObjectRole::Obstacle)
                .with_transform(Matrix4::from_translation(Vector3::new(0.0, 2.0, 5.0))),
        );

        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(Raycaster::new(ray, 0.0, 10.0).nearest(&scene, [id]).is_none());
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let hit = aabb.intersect_ray(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(hit, Some((4.0, 6.0)));

        let miss = aabb.intersect_ray(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(miss.is_none());
    }

    #[test]
    fn axis_parallel_ray_on_slab_boundary_has_no_nan() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        // Origin lies exactly on the x = 1 plane with zero x direction.
        let (t_near, t_far) = aabb
            .intersect_ray(Vector3::new(1.0, 0.0, -3.0), Vector3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_eq!((t_near, t_far), (2.0, 4.0));
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn transformed_bounds_follow_rotation() {
        let aabb = Aabb::new(Vector3::new(-0.5, -5.0, -2.5), Vector3::new(0.5, 5.0, 2.5));
        let rotated = aabb.transform(&Matrix4::from_angle_y(Rad(FRAC_PI_2)));
        assert!((rotated.max.x - 2.5).abs() < 1e-5);
        assert!((rotated.max.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn hits_rotated_wall_at_its_face() {
        let mut scene = Scene::new();
        // A quarter-turned wall is 5 wide along x and 1 deep along z.
        let id = wall(&mut scene, "wall", Vector3::new(0.0, 5.0, 6.0), FRAC_PI_2);

        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let hits = Raycaster::new(ray, 0.0, 20.0).intersect_objects(&scene, [id]);

        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 5.5).abs() < 1e-4);
        assert!((hits[0].point.z - 5.5).abs() < 1e-4);
    }

    #[test]
    fn far_bound_excludes_distant_walls() {
        let mut scene = Scene::new();
        let id = wall(&mut scene, "wall", Vector3::new(0.0, 5.0, 6.0), 0.0);

        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(Raycaster::new(ray, 0.0, 3.0).nearest(&scene, [id]).is_none());
        assert!(Raycaster::new(ray, 0.0, 4.0).nearest(&scene, [id]).is_some());
    }

    #[test]
    fn origin_inside_object_is_not_a_hit() {
        let mut scene = Scene::new();
        let id = wall(&mut scene, "wall", Vector3::new(0.0, 5.0, 0.0), 0.0);

        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(Raycaster::new(ray, 0.0, 10.0).nearest(&scene, [id]).is_none());
    }

    #[test]
    fn hits_sorted_nearest_first_with_stable_ties() {
        let mut scene = Scene::new();
        let far = wall(&mut scene, "far", Vector3::new(0.0, 5.0, 9.0), 0.0);
        let tie_a = wall(&mut scene, "tie_a", Vector3::new(0.0, 5.0, 5.0), 0.0);
        let tie_b = wall(&mut scene, "tie_b", Vector3::new(0.0, 5.0, 5.0), 0.0);

        let ray = Ray::new(Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let caster = Raycaster::new(ray, 0.0, 20.0);

        let hits = caster.intersect_objects(&scene, [far, tie_b, tie_a]);
        let order: Vec<ObjectId> = hits.iter().map(|h| h.object).collect();
        assert_eq!(order, vec![tie_b, tie_a, far]);

        let hits = caster.intersect_objects(&scene, [tie_a, far, tie_b]);
        assert_eq!(hits[0].object, tie_a);
    }
}
