//! Captured original pose of an animated entity

use glam::{Quat, Vec3};

use crate::scene::Transform;

/// The pose an entity returns to whenever an animation stops or is replaced.
///
/// Running routines only read it; it changes when a caller supplies a new
/// baseline or when a snap run settles on its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TransformSnapshot {
    /// Read the current position/rotation/scale of a transform.
    pub fn capture(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }

    /// Build a snapshot from explicit values (baseline override).
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Write the captured values back verbatim.
    pub fn restore(&self, transform: &mut Transform) {
        transform.position = self.position;
        transform.rotation = self.rotation;
        transform.scale = self.scale;
    }

    /// Whether the transform currently sits exactly on this pose.
    pub fn matches(&self, transform: &Transform) -> bool {
        self.position == transform.position
            && self.rotation == transform.rotation
            && self.scale == transform.scale
    }

    /// The snapshot as a transform value.
    pub fn to_transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.scale)
    }
}

impl From<&Transform> for TransformSnapshot {
    fn from(transform: &Transform) -> Self {
        Self::capture(transform)
    }
}
