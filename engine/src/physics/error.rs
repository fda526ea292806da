//! Physics error types
//!
//! Every fallible operation on the registry or the world reports one of these.
//! None of them is fatal: a stale handle or a rejected body description leaves
//! the world untouched, and a non-finite body is rolled back by the world itself.

use thiserror::Error;

use super::registry::BodyHandle;

/// Errors reported by the body registry and the physics world.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The handle is stale (body removed) or was never issued by this registry.
    #[error("invalid body handle {0:?}")]
    InvalidHandle(BodyHandle),

    /// The body description was rejected at creation time.
    #[error("invalid body configuration: {0}")]
    InvalidBodyConfig(String),

    /// World tunables out of range, see [`super::PhysicsConfig::validate`].
    #[error("invalid physics configuration: {0}")]
    InvalidWorldConfig(String),

    /// A velocity change was requested on a body that does not simulate.
    #[error("body {0:?} is fixed and cannot receive impulses or velocities")]
    NotDynamic(BodyHandle),

    /// Integration produced NaN/Infinity; the body was restored to its last valid state.
    #[error("body {0:?} reached a non-finite state and was restored")]
    NonFiniteState(BodyHandle),
}

impl PhysicsError {
    /// Shorthand for an [`PhysicsError::InvalidBodyConfig`] with a message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidBodyConfig(msg.into())
    }

    /// True when the error only means "the handle does not resolve".
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::InvalidHandle(_))
    }
}

/// Result alias for physics operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
