//! Per-frame driver for every animator in a scene
//!
//! Relational runs read other entities' transforms while their own transform is
//! being written. The system resolves every referenced pose into a side table
//! first, then advances all `(Transform, Animator)` pairs against that table, so
//! all animators in a frame see targets as they were when the frame began.

use std::collections::HashMap;

use hecs::Entity;

use crate::core::{Error, Result};
use crate::scene::{SceneWorld, Transform};

use super::animator::{Animator, AnimatorState, TickOutcome};
use super::mode::{IndependentMode, RelationalRequest};
use super::params::AnimationParameters;

/// Counts from one [`AnimationSystem::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Animators still running after the tick.
    pub running: usize,
    /// Animators whose run ended during the tick.
    pub completed: usize,
}

/// Drives the animators attached to scene entities.
#[derive(Default)]
pub struct AnimationSystem {
    poses: HashMap<Entity, Transform>,
    referenced: Vec<Entity>,
}

impl AnimationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every animator by `dt` seconds.
    pub fn tick(&mut self, scene: &mut SceneWorld, dt: f32) -> TickReport {
        let world = scene.world_mut();

        self.referenced.clear();
        for (_, animator) in world.query_mut::<&Animator>() {
            animator.collect_referenced(&mut self.referenced);
        }

        self.poses.clear();
        for &entity in &self.referenced {
            if let Ok(transform) = world.get::<&Transform>(entity) {
                self.poses.insert(entity, *transform);
            }
        }

        let mut report = TickReport::default();
        for (_, (transform, animator)) in world.query_mut::<(&mut Transform, &mut Animator)>() {
            match animator.tick(dt, transform, &self.poses) {
                TickOutcome::Continue => report.running += 1,
                TickOutcome::Completed => report.completed += 1,
                TickOutcome::Idle => {}
            }
        }
        report
    }

    /// Give an entity an animator whose baseline is its current transform.
    ///
    /// An existing animator is stopped (restoring its baseline) and replaced.
    pub fn attach(&self, scene: &mut SceneWorld, entity: Entity) -> Result<()> {
        let transform = detach_and_restore(scene, entity)?;
        insert_animator(scene, entity, Animator::with_baseline(&transform))
    }

    /// Apply an independent mode to every entity in `selection`.
    ///
    /// Each entity gets a fresh animator baselined on its current pose. With
    /// `live` the mode starts immediately. Missing entities are skipped. Returns
    /// the number of entities the mode was applied to.
    pub fn apply_independent(
        &self,
        scene: &mut SceneWorld,
        selection: &[Entity],
        mode: IndependentMode,
        params: &AnimationParameters,
        live: bool,
    ) -> usize {
        let mut applied = 0;
        for &entity in selection {
            let Some(mut transform) = rebaseline(scene, entity) else {
                continue;
            };
            let mut animator = Animator::with_baseline(&transform);
            animator.set_mode(mode, &mut transform, params, live);
            if install(scene, entity, animator, transform) {
                applied += 1;
            }
        }
        log::debug!("Applied {} to {}/{} entities", mode, applied, selection.len());
        applied
    }

    /// Apply a relational request to every entity in `selection`.
    ///
    /// Entities for which the request is refused keep a fresh, idle animator.
    /// Returns the number of entities the request was accepted for.
    pub fn apply_relational(
        &self,
        scene: &mut SceneWorld,
        selection: &[Entity],
        request: &RelationalRequest,
        params: &AnimationParameters,
        live: bool,
    ) -> usize {
        let mut applied = 0;
        for &entity in selection {
            let Some(mut transform) = rebaseline(scene, entity) else {
                continue;
            };
            let mut animator = Animator::with_baseline(&transform);
            let accepted = if live {
                animator.start_relational(&mut transform, request.clone(), params)
            } else {
                animator.select_relational(&mut transform, request.clone(), params)
            };
            if install(scene, entity, animator, transform) && accepted {
                applied += 1;
            }
        }
        log::debug!(
            "Applied {} to {}/{} entities",
            request.mode(),
            applied,
            selection.len()
        );
        applied
    }

    /// Stop an entity's animator, restoring its baseline.
    pub fn stop(&self, scene: &mut SceneWorld, entity: Entity) -> Result<()> {
        with_animator(scene, entity, |animator, transform| animator.stop(transform))
    }

    /// Enable or disable an entity's animator. Returns whether a run restarted.
    pub fn set_enabled(&self, scene: &mut SceneWorld, entity: Entity, enabled: bool) -> Result<bool> {
        with_animator(scene, entity, |animator, transform| {
            animator.set_enabled(enabled, transform)
        })
    }

    /// Stop and remove an entity's animator.
    pub fn detach(&self, scene: &mut SceneWorld, entity: Entity) -> Result<Animator> {
        self.stop(scene, entity)?;
        scene
            .world_mut()
            .remove_one::<Animator>(entity)
            .map_err(|_| no_animator(entity))
    }

    /// Lifecycle state of an entity's animator.
    pub fn state(&self, scene: &SceneWorld, entity: Entity) -> Option<AnimatorState> {
        scene
            .world()
            .get::<&Animator>(entity)
            .ok()
            .map(|animator| animator.state())
    }
}

fn no_animator(entity: Entity) -> Error {
    Error::Animation(format!("entity {entity:?} has no animator"))
}

fn with_animator<R>(
    scene: &mut SceneWorld,
    entity: Entity,
    f: impl FnOnce(&mut Animator, &mut Transform) -> R,
) -> Result<R> {
    if !scene.contains(entity) {
        return Err(Error::NoSuchEntity(entity));
    }
    let (transform, animator) = scene
        .world_mut()
        .query_one_mut::<(&mut Transform, &mut Animator)>(entity)
        .map_err(|_| no_animator(entity))?;
    Ok(f(animator, transform))
}

/// Remove any animator from `entity` after restoring its baseline, and return
/// the entity's resulting transform.
fn detach_and_restore(scene: &mut SceneWorld, entity: Entity) -> Result<Transform> {
    if !scene.contains(entity) {
        return Err(Error::NoSuchEntity(entity));
    }
    let world = scene.world_mut();
    if let Ok(mut old) = world.remove_one::<Animator>(entity) {
        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            old.stop(&mut transform);
        }
    }
    scene
        .transform(entity)
        .ok_or_else(|| Error::Animation(format!("entity {entity:?} has no transform")))
}

fn rebaseline(scene: &mut SceneWorld, entity: Entity) -> Option<Transform> {
    match detach_and_restore(scene, entity) {
        Ok(transform) => Some(transform),
        Err(e) => {
            log::warn!("Skipping {:?}: {}", entity, e);
            None
        }
    }
}

fn insert_animator(scene: &mut SceneWorld, entity: Entity, animator: Animator) -> Result<()> {
    scene
        .world_mut()
        .insert_one(entity, animator)
        .map_err(|_| Error::NoSuchEntity(entity))
}

fn install(scene: &mut SceneWorld, entity: Entity, animator: Animator, transform: Transform) -> bool {
    let result = scene
        .set_transform(entity, transform)
        .and_then(|()| insert_animator(scene, entity, animator));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to attach animator to {:?}: {}", entity, e);
            false
        }
    }
}
