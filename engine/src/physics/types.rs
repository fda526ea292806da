//! Physics type re-exports from glam
//!
//! This module provides the core mathematical types used throughout
//! the physics system, re-exported from the glam library.

pub use glam::{Mat3, Quat, Vec3};

/// Standard Earth gravity used by the reference scene (m/s²).
pub const EARTH_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
