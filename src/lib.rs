//! Procanim - procedural transform animation for scene entities

pub mod core;
pub mod scene;
pub mod animation;
