//! Rigid body data
//!
//! A [`RigidBody`] is the registry-owned record for one simulated object: its
//! shape (which doubles as its collider), its pose, its velocities and the
//! mass properties derived from shape and density.
//!
//! # Mass Model
//!
//! - Dynamic bodies: `mass = density * volume`, density defaults to 1.0 kg/m³
//! - Fixed bodies: infinite mass (inverse mass 0), velocities always zero
//!
//! # Example
//!
//! ```ignore
//! use drop_box_engine::physics::{BodyDesc, Shape};
//! use glam::Vec3;
//!
//! let desc = BodyDesc::dynamic(Shape::cuboid(Vec3::splat(0.5)))
//!     .at(Vec3::new(0.0, 5.0, 0.0))
//!     .with_density(2.0);
//! ```

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::error::{PhysicsError, PhysicsResult};

/// Default density in kg/m³ (a 1m cube weighs 1kg).
pub const DEFAULT_DENSITY: f32 = 1.0;

/// Default friction coefficient.
pub const DEFAULT_FRICTION: f32 = 0.5;

/// Default restitution (fully inelastic).
pub const DEFAULT_RESTITUTION: f32 = 0.0;

/// How a body takes part in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Integrates gravity and velocity, responds to contacts and impulses.
    Dynamic,
    /// Never moves. Infinite mass.
    Fixed,
}

/// Collision shape of a body, expressed in the body's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Box given by its half extents along the local axes.
    Cuboid { half_extents: Vec3 },
    /// Ball centered on the body origin.
    Sphere { radius: f32 },
}

impl Shape {
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Cuboid { half_extents }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Volume in m³.
    pub fn volume(&self) -> f32 {
        match *self {
            Shape::Cuboid { half_extents } => 8.0 * half_extents.x * half_extents.y * half_extents.z,
            Shape::Sphere { radius } => 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
        }
    }

    /// Rejects zero, negative and non-finite dimensions.
    pub fn validate(&self) -> PhysicsResult<()> {
        match *self {
            Shape::Cuboid { half_extents } => {
                if !half_extents.is_finite() || half_extents.min_element() <= 0.0 {
                    return Err(PhysicsError::invalid_config(format!(
                        "cuboid half extents must be positive and finite, got {half_extents}"
                    )));
                }
            }
            Shape::Sphere { radius } => {
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(PhysicsError::invalid_config(format!(
                        "sphere radius must be positive and finite, got {radius}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Principal moments of inertia for the given mass (diagonal of the local tensor).
    pub fn principal_inertia(&self, mass: f32) -> Vec3 {
        match *self {
            Shape::Cuboid { half_extents: h } => {
                let sq = h * h;
                Vec3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 3.0)
            }
            Shape::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
        }
    }

    /// World-space bounding box of the shape at the given pose.
    pub fn aabb(&self, position: Vec3, orientation: Quat) -> Aabb {
        let extent = match *self {
            Shape::Cuboid { half_extents } => {
                let rot = Mat3::from_quat(orientation);
                rot.x_axis.abs() * half_extents.x
                    + rot.y_axis.abs() * half_extents.y
                    + rot.z_axis.abs() * half_extents.z
            }
            Shape::Sphere { radius } => Vec3::splat(radius),
        };
        Aabb::from_center_half_extents(position, extent)
    }
}

/// Surface properties used when resolving contacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Coulomb friction coefficient (0 = ice)
    pub friction: f32,
    /// Bounciness along the contact normal (0 = no bounce, 1 = elastic)
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

impl Material {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }

    /// Combines two materials for a contact: geometric mean friction, max restitution.
    pub fn combine(&self, other: &Material) -> Material {
        Material {
            friction: (self.friction * other.friction).max(0.0).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }

    fn validate(&self) -> PhysicsResult<()> {
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(PhysicsError::invalid_config(format!(
                "friction must be finite and non-negative, got {}",
                self.friction
            )));
        }
        if !self.restitution.is_finite() || !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::invalid_config(format!(
                "restitution must lie in [0, 1], got {}",
                self.restitution
            )));
        }
        Ok(())
    }
}

/// Everything needed to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
    pub density: f32,
    pub material: Material,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            density: DEFAULT_DENSITY,
            material: Material::default(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    pub fn dynamic(shape: Shape) -> Self {
        Self::new(BodyKind::Dynamic, shape)
    }

    pub fn fixed(shape: Shape) -> Self {
        Self::new(BodyKind::Fixed, shape)
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }
}

/// Read-only snapshot of a body handed out by the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Mass in kg, `f32::INFINITY` for fixed bodies
    pub mass: f32,
    pub sleeping: bool,
}

/// Pose and velocities, used to roll a body back after a bad step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Kinematics {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// A simulated body. Owned by a [`super::BodyRegistry`].
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) kind: BodyKind,
    pub(crate) shape: Shape,
    pub(crate) position: Vec3,
    pub(crate) orientation: Quat,
    pub(crate) linear_velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    pub(crate) mass: f32,
    pub(crate) inv_mass: f32,
    /// Inverse principal inertia in the local frame (zero for fixed bodies)
    pub(crate) inv_inertia_local: Vec3,
    pub(crate) material: Material,
    pub(crate) sleeping: bool,
    /// Seconds spent below the sleep thresholds
    pub(crate) rest_time: f32,
}

impl RigidBody {
    /// Validates a description and derives mass properties from it.
    pub fn from_desc(desc: &BodyDesc) -> PhysicsResult<Self> {
        desc.shape.validate()?;
        desc.material.validate()?;

        if !desc.position.is_finite() {
            return Err(PhysicsError::invalid_config(format!(
                "position must be finite, got {}",
                desc.position
            )));
        }
        if !desc.orientation.is_finite() || desc.orientation.length_squared() < 1e-12 {
            return Err(PhysicsError::invalid_config(format!(
                "orientation must be a finite non-zero quaternion, got {}",
                desc.orientation
            )));
        }
        if !desc.linear_velocity.is_finite() || !desc.angular_velocity.is_finite() {
            return Err(PhysicsError::invalid_config("initial velocities must be finite"));
        }

        let orientation = desc.orientation.normalize();

        match desc.kind {
            BodyKind::Fixed => {
                if desc.linear_velocity != Vec3::ZERO || desc.angular_velocity != Vec3::ZERO {
                    return Err(PhysicsError::invalid_config(
                        "fixed bodies cannot have an initial velocity",
                    ));
                }
                Ok(Self {
                    kind: BodyKind::Fixed,
                    shape: desc.shape,
                    position: desc.position,
                    orientation,
                    linear_velocity: Vec3::ZERO,
                    angular_velocity: Vec3::ZERO,
                    mass: f32::INFINITY,
                    inv_mass: 0.0,
                    inv_inertia_local: Vec3::ZERO,
                    material: desc.material,
                    sleeping: false,
                    rest_time: 0.0,
                })
            }
            BodyKind::Dynamic => {
                if !desc.density.is_finite() || desc.density <= 0.0 {
                    return Err(PhysicsError::invalid_config(format!(
                        "dynamic bodies need a positive finite density, got {}",
                        desc.density
                    )));
                }
                let mass = desc.density * desc.shape.volume();
                if !mass.is_finite() || mass <= 0.0 {
                    return Err(PhysicsError::invalid_config(format!(
                        "derived mass {mass} is not usable for a dynamic body"
                    )));
                }
                let inertia = desc.shape.principal_inertia(mass);
                Ok(Self {
                    kind: BodyKind::Dynamic,
                    shape: desc.shape,
                    position: desc.position,
                    orientation,
                    linear_velocity: desc.linear_velocity,
                    angular_velocity: desc.angular_velocity,
                    mass,
                    inv_mass: 1.0 / mass,
                    inv_inertia_local: inertia.recip(),
                    material: desc.material,
                    sleeping: false,
                    rest_time: 0.0,
                })
            }
        }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn is_fixed(&self) -> bool {
        self.kind == BodyKind::Fixed
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Dynamic and not sleeping.
    pub fn is_awake_dynamic(&self) -> bool {
        self.is_dynamic() && !self.sleeping
    }

    /// Inverse inertia tensor rotated into world space.
    pub fn world_inverse_inertia(&self) -> Mat3 {
        let rot = Mat3::from_quat(self.orientation);
        rot * Mat3::from_diagonal(self.inv_inertia_local) * rot.transpose()
    }

    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position, self.orientation)
    }

    /// Velocity of the material point at `offset` from the center.
    pub fn velocity_at(&self, offset: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(offset)
    }

    pub fn state(&self) -> BodyState {
        BodyState {
            kind: self.kind,
            shape: self.shape,
            position: self.position,
            orientation: self.orientation,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            mass: self.mass,
            sleeping: self.sleeping,
        }
    }

    pub(crate) fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.position,
            orientation: self.orientation,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
        }
    }

    /// Restores a snapshot and drops all velocity.
    pub(crate) fn restore(&mut self, snapshot: &Kinematics) {
        self.position = snapshot.position;
        self.orientation = snapshot.orientation;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.rest_time = 0.0;
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.orientation.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }

    pub(crate) fn wake_up(&mut self) {
        if self.sleeping {
            self.sleeping = false;
        }
        self.rest_time = 0.0;
    }

    pub(crate) fn put_to_sleep(&mut self) {
        self.sleeping = true;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}
