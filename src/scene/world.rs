//! Entity world holding the scene objects animators act on.
//!
//! A thin wrapper over a `hecs::World`. Every entity spawned through
//! [`SceneWorld::spawn`] carries a [`Name`] and a [`Transform`]; animators are
//! attached later as an extra component by the animation system.

use hecs::{Entity, World};

use crate::core::{Error, Result};

use super::transform::Transform;

/// Display name of a scene entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name(pub String);

/// Scene entity storage.
pub struct SceneWorld {
    world: World,
}

impl SceneWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self { world: World::new() }
    }

    /// Spawn a named entity with the given transform.
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> Entity {
        self.world.spawn((Name(name.into()), transform))
    }

    /// Remove an entity and all of its components.
    pub fn despawn(&mut self, entity: Entity) -> Result<()> {
        self.world
            .despawn(entity)
            .map_err(|_| Error::NoSuchEntity(entity))
    }

    /// Whether the entity is still alive.
    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Number of live entities.
    pub fn len(&self) -> u32 {
        self.world.len()
    }

    /// Whether the world has no entities.
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Current transform of an entity, if it exists and has one.
    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    /// Overwrite an entity's transform (an external edit, e.g. from a gizmo).
    pub fn set_transform(&mut self, entity: Entity, transform: Transform) -> Result<()> {
        let mut current = self
            .world
            .get::<&mut Transform>(entity)
            .map_err(|_| Error::NoSuchEntity(entity))?;
        *current = transform;
        Ok(())
    }

    /// Name of an entity.
    pub fn name(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    /// Find the first entity with the given name.
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
    }

    /// Borrow the underlying ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutably borrow the underlying ECS world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}
