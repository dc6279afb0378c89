//! Core type aliases and re-exports

pub use glam::{EulerRot, Mat3, Quat, Vec3};
pub use hecs::Entity;

/// Standard Result type for the engine
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
