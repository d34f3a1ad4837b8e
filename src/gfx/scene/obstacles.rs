//! Registry of objects that can block the camera's view of the avatar.

use super::object::{Object, ObjectId};
use crate::error::SceneError;

/// Insertion-ordered set of occluder ids.
///
/// Membership only grows while the scene is being built; [`ObstacleSet::seal`]
/// freezes it before the first frame. The insertion order is also the tie
/// break between equally distant raycast hits.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    ids: Vec<ObjectId>,
    sealed: bool,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id`, refusing ground/avatar geometry, duplicates and late additions.
    pub fn register(&mut self, id: ObjectId, object: &Object) -> Result<(), SceneError> {
        if self.sealed {
            return Err(SceneError::ObstaclesSealed);
        }
        if !object.role.can_occlude() {
            return Err(SceneError::SelfOcclusion {
                name: object.name.clone(),
                role: object.role,
            });
        }
        if self.contains(id) {
            return Err(SceneError::DuplicateObstacle(object.name.clone()));
        }

        self.ids.push(id);
        Ok(())
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Ids in insertion order
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::ObjectRole;

    fn object(name: &str, role: ObjectRole) -> Object {
        Object::new(name, Vec::new(), role)
    }

    #[test]
    fn keeps_insertion_order() {
        let mut set = ObstacleSet::new();
        set.register(ObjectId(4), &object("a", ObjectRole::Obstacle)).unwrap();
        set.register(ObjectId(1), &object("b", ObjectRole::Obstacle)).unwrap();
        set.register(ObjectId(7), &object("c", ObjectRole::Prop)).unwrap();

        assert_eq!(set.as_slice(), &[ObjectId(4), ObjectId(1), ObjectId(7)]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn refuses_ground_and_avatar() {
        let mut set = ObstacleSet::new();
        let err = set.register(ObjectId(0), &object("ground", ObjectRole::Ground)).unwrap_err();
        assert_eq!(
            err,
            SceneError::SelfOcclusion {
                name: "ground".to_string(),
                role: ObjectRole::Ground
            }
        );
        assert!(set.register(ObjectId(1), &object("capsule", ObjectRole::Avatar)).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn refuses_duplicates() {
        let mut set = ObstacleSet::new();
        let wall = object("wall", ObjectRole::Obstacle);
        set.register(ObjectId(2), &wall).unwrap();
        assert_eq!(
            set.register(ObjectId(2), &wall),
            Err(SceneError::DuplicateObstacle("wall".to_string()))
        );
    }

    #[test]
    fn sealed_set_is_frozen() {
        let mut set = ObstacleSet::new();
        set.seal();
        assert!(set.is_sealed());
        assert_eq!(
            set.register(ObjectId(0), &object("wall", ObjectRole::Obstacle)),
            Err(SceneError::ObstaclesSealed)
        );
    }
}
