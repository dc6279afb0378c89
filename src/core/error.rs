//! Error types for the procanim engine

use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Unknown animation mode: {0}")]
    UnknownMode(String),

    #[error("No such entity: {0:?}")]
    NoSuchEntity(hecs::Entity),

    #[error("Animation error: {0}")]
    Animation(String),
}
