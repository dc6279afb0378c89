//! Scene entities and their transforms

pub mod transform;
pub mod world;

pub use transform::Transform;
pub use world::{Name, SceneWorld};
