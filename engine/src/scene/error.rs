//! Scene error types

use glam::Vec3;
use thiserror::Error;

use crate::physics::PhysicsError;

/// Errors raised while loading or building a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A body of the scene was rejected by the physics world.
    #[error("scene body '{name}' rejected: {source}")]
    Body {
        name: String,
        #[source]
        source: PhysicsError,
    },

    /// The `physics` section holds out-of-range solver settings.
    #[error("scene physics settings rejected: {0}")]
    Physics(#[source] PhysicsError),

    #[error("scene has no player body")]
    MissingPlayer,

    #[error("scene has more than one player body")]
    DuplicatePlayer,

    #[error("player body must be dynamic")]
    FixedPlayer,

    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    #[error("gravity must be finite, got {0}")]
    InvalidGravity(Vec3),
}

pub type SceneResult<T> = Result<T, SceneError>;
