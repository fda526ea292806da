//! Physics module
//!
//! A small rigid-body simulator built directly on glam math. No external
//! physics library is involved.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg, density in kg/m³
//! - Impulses in N·s
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat) re-exported from glam
//! - [`body`] - Shapes, materials, body descriptions and the body record
//! - [`registry`] - Handle-addressed body storage
//! - [`collision`] - AABB broad phase and box/sphere narrow phase
//! - [`world`] - Gravity, integration, contact resolution and sleeping
//! - [`error`] - Error type shared by the physics API

pub mod body;
pub mod collision;
pub mod error;
pub mod registry;
pub mod types;
pub mod world;

pub use body::{BodyDesc, BodyKind, BodyState, Material, RigidBody, Shape};
pub use collision::{Aabb, Contact, ContactGeometry, ContactPoint, Pose, shape_contact};
pub use error::{PhysicsError, PhysicsResult};
pub use registry::{BodyHandle, BodyRegistry};
pub use types::{EARTH_GRAVITY, Quat, Vec3};
pub use world::{MAX_SOLVER_ITERATIONS, MAX_SUBSTEPS, PhysicsConfig, PhysicsWorld, StepReport};
