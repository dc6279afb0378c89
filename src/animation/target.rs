//! Read-only access to the poses relational motions refer to

use std::collections::HashMap;

use hecs::{Entity, World};

use crate::scene::{SceneWorld, Transform};

/// Resolves a referenced entity to its current pose.
///
/// `None` means the entity no longer exists; relational motions treat that as
/// losing their target.
pub trait TargetLookup {
    fn transform_of(&self, entity: Entity) -> Option<Transform>;
}

impl TargetLookup for World {
    fn transform_of(&self, entity: Entity) -> Option<Transform> {
        self.get::<&Transform>(entity).ok().map(|t| *t)
    }
}

impl TargetLookup for SceneWorld {
    fn transform_of(&self, entity: Entity) -> Option<Transform> {
        self.transform(entity)
    }
}

impl TargetLookup for HashMap<Entity, Transform> {
    fn transform_of(&self, entity: Entity) -> Option<Transform> {
        self.get(&entity).copied()
    }
}
