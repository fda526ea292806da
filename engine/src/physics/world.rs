//! Physics world
//!
//! Owns the body registry, the gravity vector and the simulation clock, and
//! advances everything with [`PhysicsWorld::step`].
//!
//! # Step Pipeline
//!
//! 1. Split `dt` into at most [`MAX_SUBSTEPS`] substeps of `config.max_substep`
//! 2. Snapshot every dynamic body
//! 3. Semi-implicit Euler: gravity into velocity, speed clamp, velocity into pose
//! 4. Contact detection (AABB broad phase, shape-pair narrow phase manifolds)
//! 5. Wake sleeping bodies that an awake body pushes into
//! 6. Velocity solve: normal and friction impulses at every manifold point,
//!    with lever arms, accumulated over `config.solver_iterations` passes
//! 7. Positional projection by inverse mass, contacts re-detected each pass
//! 8. Sleep bookkeeping
//! 9. Non-finite guard: broken bodies are rolled back to their snapshot

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::body::{BodyDesc, BodyKind, BodyState, Kinematics, RigidBody, Shape};
use super::collision::{Aabb, Contact, Pose, shape_contact};
use super::error::{PhysicsError, PhysicsResult};
use super::registry::{BodyHandle, BodyRegistry};
use super::types::EARTH_GRAVITY;

/// Upper bound on substeps per call to [`PhysicsWorld::step`].
pub const MAX_SUBSTEPS: usize = 8;

/// Upper bound on `PhysicsConfig::solver_iterations`.
pub const MAX_SOLVER_ITERATIONS: u32 = 64;

/// Closing speed below which contacts do not bounce (m/s).
const RESTITUTION_THRESHOLD: f32 = 0.5;

/// Tunables for the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Largest integration step; longer `dt` values are split into substeps (s)
    pub max_substep: f32,
    /// Velocity and position passes per substep, `1..=MAX_SOLVER_ITERATIONS`
    pub solver_iterations: u32,
    /// Penetration left uncorrected so resting contacts persist between steps (m)
    pub penetration_slop: f32,
    /// Speed cap for dynamic bodies, `None` disables it (m/s)
    pub max_linear_speed: Option<f32>,
    /// Spin cap for dynamic bodies, `None` disables it (rad/s)
    pub max_angular_speed: Option<f32>,
    /// Let resting bodies stop integrating until something wakes them
    pub allow_sleeping: bool,
    /// Linear speed below which a body counts as resting (m/s)
    pub sleep_linear_threshold: f32,
    /// Angular speed below which a body counts as resting (rad/s)
    pub sleep_angular_threshold: f32,
    /// Time a body must rest before falling asleep (s)
    pub sleep_time: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_substep: 1.0 / 60.0,
            solver_iterations: 8,
            penetration_slop: 0.001,
            max_linear_speed: Some(100.0),
            max_angular_speed: Some(50.0),
            allow_sleeping: true,
            sleep_linear_threshold: 0.05,
            sleep_angular_threshold: 0.05,
            sleep_time: 0.5,
        }
    }
}

impl PhysicsConfig {
    /// Range checks for values that come from scene files.
    pub fn validate(&self) -> PhysicsResult<()> {
        fn invalid(msg: String) -> PhysicsResult<()> {
            Err(PhysicsError::InvalidWorldConfig(msg))
        }

        if !(self.max_substep > 0.0 && self.max_substep.is_finite()) {
            return invalid(format!("max_substep must be positive and finite, got {}", self.max_substep));
        }
        if !(1..=MAX_SOLVER_ITERATIONS).contains(&self.solver_iterations) {
            return invalid(format!(
                "solver_iterations must lie in 1..={MAX_SOLVER_ITERATIONS}, got {}",
                self.solver_iterations
            ));
        }
        if !(self.penetration_slop >= 0.0 && self.penetration_slop.is_finite()) {
            return invalid(format!(
                "penetration_slop must be non-negative and finite, got {}",
                self.penetration_slop
            ));
        }
        for (name, cap) in [
            ("max_linear_speed", self.max_linear_speed),
            ("max_angular_speed", self.max_angular_speed),
        ] {
            if let Some(cap) = cap {
                if !(cap > 0.0 && cap.is_finite()) {
                    return invalid(format!("{name} must be positive and finite, got {cap}"));
                }
            }
        }
        for (name, value) in [
            ("sleep_linear_threshold", self.sleep_linear_threshold),
            ("sleep_angular_threshold", self.sleep_angular_threshold),
            ("sleep_time", self.sleep_time),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return invalid(format!("{name} must be non-negative and finite, got {value}"));
            }
        }
        Ok(())
    }
}

/// Solver state for one manifold point.
#[derive(Debug, Clone, Copy)]
struct ContactConstraint {
    a: BodyHandle,
    b: BodyHandle,
    normal: Vec3,
    /// Lever arms from each body center to the point
    r_a: Vec3,
    r_b: Vec3,
    /// Zero for fixed and sleeping bodies
    inv_mass_a: f32,
    inv_mass_b: f32,
    inv_inertia_a: Mat3,
    inv_inertia_b: Mat3,
    normal_mass: f32,
    friction: f32,
    /// Normal velocity the solver drives toward
    target_speed: f32,
    normal_impulse: f32,
    tangent_impulse: Vec3,
}

impl ContactConstraint {
    /// Inverse of the impulse needed per unit velocity change along `direction`.
    fn effective_mass(&self, direction: Vec3) -> f32 {
        let arm_a = self.r_a.cross(direction);
        let arm_b = self.r_b.cross(direction);
        let k = self.inv_mass_a
            + self.inv_mass_b
            + arm_a.dot(self.inv_inertia_a * arm_a)
            + arm_b.dot(self.inv_inertia_b * arm_b);
        if k > 0.0 { 1.0 / k } else { 0.0 }
    }
}

/// Inverse mass and world inverse inertia a contact sees, zero unless awake and dynamic.
fn contact_inverse_mass(body: &RigidBody) -> (f32, Mat3) {
    if body.is_awake_dynamic() {
        (body.inv_mass, body.world_inverse_inertia())
    } else {
        (0.0, Mat3::ZERO)
    }
}

/// Summary of one call to [`PhysicsWorld::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Substeps actually integrated (0 when `dt` was rejected)
    pub substeps: usize,
    /// Contacts found in the final resolution pass of the last substep
    pub contacts: usize,
    /// Recovered faults, currently only [`PhysicsError::NonFiniteState`]
    pub warnings: Vec<PhysicsError>,
}

impl StepReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// The simulated world.
pub struct PhysicsWorld {
    bodies: BodyRegistry,
    gravity: Vec3,
    time: f64,
    config: PhysicsConfig,
    /// Contacts of the last resolution pass
    contacts: Vec<Contact>,
    /// Per-substep rollback snapshots
    snapshots: Vec<(BodyHandle, Kinematics)>,
    /// Broad-phase scratch: handle, bounds, awake dynamic
    bounds: Vec<(BodyHandle, Aabb, bool)>,
    /// Velocity solver scratch
    constraints: Vec<ContactConstraint>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(EARTH_GRAVITY)
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self::with_config(gravity, PhysicsConfig::default())
    }

    pub fn with_config(gravity: Vec3, config: PhysicsConfig) -> Self {
        Self {
            bodies: BodyRegistry::new(),
            gravity,
            time: 0.0,
            config,
            contacts: Vec::new(),
            snapshots: Vec::new(),
            bounds: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Change gravity and wake every body so resting bodies notice.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
        self.wake_all();
    }

    /// Accumulated simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        &mut self.config
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodyRegistry {
        &mut self.bodies
    }

    /// Contact manifolds from the last position pass, for debug drawing.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn create(
        &mut self,
        kind: BodyKind,
        shape: Shape,
        position: Vec3,
        orientation: Quat,
    ) -> PhysicsResult<BodyHandle> {
        self.bodies.create(kind, shape, position, orientation)
    }

    pub fn create_with(&mut self, desc: BodyDesc) -> PhysicsResult<BodyHandle> {
        self.bodies.create_with(desc)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<BodyState> {
        self.bodies.get(handle)
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
        self.bodies.apply_impulse(handle, impulse)
    }

    /// Remove a body. Everything else is woken since it may have rested on it.
    pub fn remove(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        self.bodies.remove(handle)?;
        self.wake_all();
        Ok(())
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Zero, negative and NaN `dt` are no-ops.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let mut report = StepReport::default();
        if !(dt > 0.0) {
            return report;
        }

        let substeps = if dt.is_finite() && self.config.max_substep > 0.0 {
            ((dt / self.config.max_substep).ceil() as usize).clamp(1, MAX_SUBSTEPS)
        } else {
            MAX_SUBSTEPS
        };
        let sub_dt = dt / substeps as f32;

        for _ in 0..substeps {
            self.substep(sub_dt, &mut report);
        }
        report.substeps = substeps;
        report.contacts = self.contacts.len();

        if dt.is_finite() {
            self.time += f64::from(dt);
        } else {
            log::warn!("non-finite dt {dt} not added to the simulation clock");
        }

        report
    }

    fn substep(&mut self, dt: f32, report: &mut StepReport) {
        self.snapshots.clear();
        self.snapshots.extend(
            self.bodies
                .iter()
                .filter(|(_, body)| body.is_dynamic())
                .map(|(handle, body)| (handle, body.kinematics())),
        );

        self.integrate(dt);

        self.detect_contacts();
        self.wake_touched();
        self.prepare_constraints(dt);
        let iterations = self.config.solver_iterations.clamp(1, MAX_SOLVER_ITERATIONS);
        for _ in 0..iterations {
            self.solve_velocities();
        }
        for _ in 0..iterations {
            self.project_positions();
            self.detect_contacts();
        }

        self.update_sleep(dt);
        self.guard_non_finite(report);
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        let max_linear = self.config.max_linear_speed;
        let max_angular = self.config.max_angular_speed;

        for (_, body) in self.bodies.iter_mut() {
            if !body.is_awake_dynamic() {
                continue;
            }

            body.linear_velocity += gravity * dt;
            if let Some(max) = max_linear {
                body.linear_velocity = body.linear_velocity.clamp_length_max(max);
            }
            if let Some(max) = max_angular {
                body.angular_velocity = body.angular_velocity.clamp_length_max(max);
            }

            body.position += body.linear_velocity * dt;

            let spin = body.angular_velocity * dt;
            if spin != Vec3::ZERO {
                body.orientation = (Quat::from_scaled_axis(spin) * body.orientation).normalize();
            }
        }
    }

    fn detect_contacts(&mut self) {
        self.contacts.clear();
        self.bounds.clear();
        self.bounds.extend(
            self.bodies
                .iter()
                .map(|(handle, body)| (handle, body.aabb(), body.is_awake_dynamic())),
        );

        for i in 0..self.bounds.len() {
            let (handle_a, aabb_a, active_a) = self.bounds[i];
            for &(handle_b, aabb_b, active_b) in &self.bounds[i + 1..] {
                // Static, sleeping and fixed bodies never need contacts among themselves
                if !active_a && !active_b {
                    continue;
                }
                if !aabb_a.intersects(&aabb_b) {
                    continue;
                }
                let (Some(a), Some(b)) = (self.bodies.body(handle_a), self.bodies.body(handle_b)) else {
                    continue;
                };
                let pose_a = Pose::new(a.position, a.orientation);
                let pose_b = Pose::new(b.position, b.orientation);
                if let Some(geometry) = shape_contact(&a.shape, &pose_a, &b.shape, &pose_b) {
                    self.contacts.push(Contact::new(handle_a, handle_b, geometry));
                }
            }
        }
    }

    /// A sleeping body joins the simulation again once an awake body pushes
    /// into it deeper than the slop or closes on it faster than the sleep
    /// threshold. Resting neighbors that merely touch leave it asleep.
    fn wake_touched(&mut self) {
        let slop = self.config.penetration_slop;
        let closing = self.config.sleep_linear_threshold;

        for contact in &self.contacts {
            let (Some(a), Some(b)) = (self.bodies.body(contact.a), self.bodies.body(contact.b)) else {
                continue;
            };
            let sleeper = match (a.is_sleeping(), b.is_sleeping()) {
                (true, false) => contact.a,
                (false, true) => contact.b,
                _ => continue,
            };
            let approach = (b.linear_velocity - a.linear_velocity).dot(contact.normal());
            if contact.penetration() > slop || approach < -closing {
                if let Some(body) = self.bodies.body_mut(sleeper) {
                    body.wake_up();
                    log::debug!("body {:?} woken by contact", sleeper);
                }
            }
        }
    }

    fn prepare_constraints(&mut self, dt: f32) {
        self.constraints.clear();

        for contact in &self.contacts {
            let (Some(a), Some(b)) = (self.bodies.body(contact.a), self.bodies.body(contact.b)) else {
                continue;
            };
            let (inv_mass_a, inv_inertia_a) = contact_inverse_mass(a);
            let (inv_mass_b, inv_inertia_b) = contact_inverse_mass(b);
            if inv_mass_a + inv_mass_b <= 0.0 {
                continue;
            }
            let material = a.material.combine(&b.material);
            let normal = contact.normal();

            for point in contact.points() {
                let r_a = point.position - a.position;
                let r_b = point.position - b.position;
                let mut constraint = ContactConstraint {
                    a: contact.a,
                    b: contact.b,
                    normal,
                    r_a,
                    r_b,
                    inv_mass_a,
                    inv_mass_b,
                    inv_inertia_a,
                    inv_inertia_b,
                    normal_mass: 0.0,
                    friction: material.friction,
                    target_speed: 0.0,
                    normal_impulse: 0.0,
                    tangent_impulse: Vec3::ZERO,
                };
                constraint.normal_mass = constraint.effective_mass(normal);

                let approach = (b.velocity_at(r_b) - a.velocity_at(r_a)).dot(normal);
                constraint.target_speed = if point.penetration < 0.0 {
                    // Speculative point: allow closing the gap within this substep
                    point.penetration / dt
                } else if approach < -RESTITUTION_THRESHOLD {
                    -material.restitution * approach
                } else {
                    0.0
                };
                self.constraints.push(constraint);
            }
        }
    }

    /// One sequential-impulse pass over every manifold point.
    fn solve_velocities(&mut self) {
        for index in 0..self.constraints.len() {
            let mut constraint = self.constraints[index];

            // Normal impulse, accumulated and kept non-negative
            let Some(relative) = self.relative_velocity(&constraint) else {
                continue;
            };
            let normal_speed = relative.dot(constraint.normal);
            let lambda = (constraint.target_speed - normal_speed) * constraint.normal_mass;
            let accumulated = (constraint.normal_impulse + lambda).max(0.0);
            let delta = accumulated - constraint.normal_impulse;
            constraint.normal_impulse = accumulated;
            self.apply_contact_impulse(&constraint, constraint.normal * delta);

            // Coulomb friction, accumulated impulse kept inside the cone
            let Some(relative) = self.relative_velocity(&constraint) else {
                self.constraints[index] = constraint;
                continue;
            };
            let tangent_velocity = relative - constraint.normal * relative.dot(constraint.normal);
            let tangent_speed = tangent_velocity.length();
            if tangent_speed > 1e-6 {
                let tangent = tangent_velocity / tangent_speed;
                let impulse = -tangent * tangent_speed * constraint.effective_mass(tangent);
                let limit = constraint.friction * constraint.normal_impulse;
                let accumulated = (constraint.tangent_impulse + impulse).clamp_length_max(limit);
                let delta = accumulated - constraint.tangent_impulse;
                constraint.tangent_impulse = accumulated;
                self.apply_contact_impulse(&constraint, delta);
            }

            self.constraints[index] = constraint;
        }
    }

    /// Velocity of the point on `b` relative to the point on `a`.
    fn relative_velocity(&self, constraint: &ContactConstraint) -> Option<Vec3> {
        let a = self.bodies.body(constraint.a)?;
        let b = self.bodies.body(constraint.b)?;
        Some(b.velocity_at(constraint.r_b) - a.velocity_at(constraint.r_a))
    }

    /// Apply `impulse` to `b` at its lever arm and the opposite to `a`.
    fn apply_contact_impulse(&mut self, constraint: &ContactConstraint, impulse: Vec3) {
        if constraint.inv_mass_a > 0.0 {
            if let Some(body) = self.bodies.body_mut(constraint.a) {
                body.linear_velocity -= impulse * constraint.inv_mass_a;
                body.angular_velocity -= constraint.inv_inertia_a * constraint.r_a.cross(impulse);
            }
        }
        if constraint.inv_mass_b > 0.0 {
            if let Some(body) = self.bodies.body_mut(constraint.b) {
                body.linear_velocity += impulse * constraint.inv_mass_b;
                body.angular_velocity += constraint.inv_inertia_b * constraint.r_b.cross(impulse);
            }
        }
    }

    /// Push overlapping pairs apart by `penetration - slop`, split by inverse mass.
    fn project_positions(&mut self) {
        let slop = self.config.penetration_slop;

        for contact in &self.contacts {
            let correction = contact.penetration() - slop;
            if correction <= 0.0 {
                continue;
            }
            let (Some(a), Some(b)) = (self.bodies.body(contact.a), self.bodies.body(contact.b)) else {
                continue;
            };
            let inv_a = if a.is_awake_dynamic() { a.inv_mass } else { 0.0 };
            let inv_b = if b.is_awake_dynamic() { b.inv_mass } else { 0.0 };
            let inv_sum = inv_a + inv_b;
            if inv_sum <= 0.0 {
                continue;
            }

            let shift = contact.normal() * (correction / inv_sum);
            if inv_a > 0.0 {
                if let Some(body) = self.bodies.body_mut(contact.a) {
                    body.position -= shift * inv_a;
                }
            }
            if inv_b > 0.0 {
                if let Some(body) = self.bodies.body_mut(contact.b) {
                    body.position += shift * inv_b;
                }
            }
        }
    }

    fn update_sleep(&mut self, dt: f32) {
        if !self.config.allow_sleeping {
            return;
        }
        let linear = self.config.sleep_linear_threshold;
        let angular = self.config.sleep_angular_threshold;
        let sleep_time = self.config.sleep_time;

        for (handle, body) in self.bodies.iter_mut() {
            if !body.is_awake_dynamic() {
                continue;
            }
            if body.linear_velocity.length() < linear && body.angular_velocity.length() < angular {
                body.rest_time += dt;
                if body.rest_time >= sleep_time {
                    body.put_to_sleep();
                    log::debug!("body {:?} fell asleep at {}", handle, body.position);
                }
            } else {
                body.rest_time = 0.0;
            }
        }
    }

    fn guard_non_finite(&mut self, report: &mut StepReport) {
        for (handle, snapshot) in &self.snapshots {
            let Some(body) = self.bodies.body_mut(*handle) else {
                continue;
            };
            if body.is_finite() {
                continue;
            }
            log::warn!(
                "body {:?} reached a non-finite state, restoring position {}",
                handle,
                snapshot.position
            );
            body.restore(snapshot);
            report.warnings.push(PhysicsError::NonFiniteState(*handle));
        }
    }

    fn wake_all(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            if body.is_dynamic() {
                body.wake_up();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Shape {
        Shape::cuboid(Vec3::splat(0.5))
    }

    #[test]
    fn test_zero_and_negative_dt_are_noops() {
        let mut world = PhysicsWorld::default();
        let body = world
            .create(BodyKind::Dynamic, unit_box(), Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY)
            .unwrap();

        for dt in [0.0, -1.0, f32::NAN] {
            let report = world.step(dt);
            assert_eq!(report.substeps, 0);
        }
        assert_eq!(world.get(body).unwrap().position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(world.time(), 0.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(PhysicsConfig::default().validate().is_ok());

        let rejected = [
            PhysicsConfig {
                solver_iterations: 4_000_000_000,
                ..PhysicsConfig::default()
            },
            PhysicsConfig {
                solver_iterations: 0,
                ..PhysicsConfig::default()
            },
            PhysicsConfig {
                penetration_slop: -0.01,
                ..PhysicsConfig::default()
            },
            PhysicsConfig {
                sleep_linear_threshold: f32::NAN,
                ..PhysicsConfig::default()
            },
            PhysicsConfig {
                max_substep: 0.0,
                ..PhysicsConfig::default()
            },
            PhysicsConfig {
                max_angular_speed: Some(f32::INFINITY),
                ..PhysicsConfig::default()
            },
        ];
        for config in rejected {
            assert!(
                matches!(config.validate(), Err(PhysicsError::InvalidWorldConfig(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn test_huge_iteration_count_is_capped_in_step() {
        let config = PhysicsConfig {
            solver_iterations: u32::MAX,
            ..PhysicsConfig::default()
        };
        let mut world = PhysicsWorld::with_config(EARTH_GRAVITY, config);
        world
            .create(BodyKind::Dynamic, unit_box(), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        assert_eq!(world.step(1.0 / 60.0).substeps, 1);
    }

    #[test]
    fn test_large_dt_is_split_into_substeps() {
        let mut world = PhysicsWorld::default();
        assert_eq!(world.step(1.0 / 60.0).substeps, 1);
        assert_eq!(world.step(0.04).substeps, 3);
        assert_eq!(world.step(10.0).substeps, MAX_SUBSTEPS);
        assert!((world.time() - (1.0 / 60.0 + 0.04 + 10.0)).abs() < 1e-5);
    }

    #[test]
    fn test_fixed_body_is_never_integrated() {
        let mut world = PhysicsWorld::default();
        let ground = world
            .create(BodyKind::Fixed, unit_box(), Vec3::new(0.0, 3.0, 0.0), Quat::IDENTITY)
            .unwrap();
        let before = world.get(ground).unwrap();
        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        assert_eq!(world.get(ground).unwrap(), before);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world.create_with(BodyDesc::dynamic(Shape::sphere(0.5))).unwrap();
        world
            .bodies_mut()
            .set_linear_velocity(body, Vec3::new(1000.0, 0.0, 0.0))
            .unwrap();
        world.step(1.0 / 60.0);
        let speed = world.get(body).unwrap().linear_velocity.length();
        assert!(speed <= 100.0 + 1e-3);
    }

    #[test]
    fn test_speed_clamp_can_be_disabled() {
        let config = PhysicsConfig {
            max_linear_speed: None,
            ..PhysicsConfig::default()
        };
        let mut world = PhysicsWorld::with_config(Vec3::ZERO, config);
        let body = world.create_with(BodyDesc::dynamic(Shape::sphere(0.5))).unwrap();
        world
            .bodies_mut()
            .set_linear_velocity(body, Vec3::new(1000.0, 0.0, 0.0))
            .unwrap();
        world.step(1.0 / 60.0);
        assert_eq!(world.get(body).unwrap().linear_velocity.x, 1000.0);
    }

    #[test]
    fn test_angular_velocity_rotates_and_stays_normalized() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world
            .create_with(
                BodyDesc::dynamic(unit_box()).with_angular_velocity(Vec3::new(0.0, std::f32::consts::PI, 0.0)),
            )
            .unwrap();

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let orientation = world.get(body).unwrap().orientation;
        assert!(orientation.is_normalized());
        let expected = Quat::from_rotation_y(std::f32::consts::PI);
        assert!(orientation.dot(expected).abs() > 0.999);
    }

    #[test]
    fn test_infinite_dt_restores_body() {
        let mut world = PhysicsWorld::default();
        let body = world
            .create(BodyKind::Dynamic, unit_box(), Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY)
            .unwrap();

        let report = world.step(f32::INFINITY);
        assert!(!report.is_clean());
        assert_eq!(report.warnings[0], PhysicsError::NonFiniteState(body));

        let state = world.get(body).unwrap();
        assert_eq!(state.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(state.linear_velocity, Vec3::ZERO);
        assert!(world.time().is_finite());
    }

    #[test]
    fn test_resting_body_sleeps_and_impulse_wakes_it() {
        let mut world = PhysicsWorld::default();
        world
            .create(BodyKind::Fixed, Shape::cuboid(Vec3::new(5.0, 0.25, 5.0)), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        let crate_box = world
            .create(BodyKind::Dynamic, unit_box(), Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY)
            .unwrap();

        for _ in 0..180 {
            world.step(1.0 / 60.0);
        }
        assert!(world.get(crate_box).unwrap().sleeping);

        world.apply_impulse(crate_box, Vec3::new(0.5, 0.0, 0.0)).unwrap();
        let state = world.get(crate_box).unwrap();
        assert!(!state.sleeping);
        assert!((state.linear_velocity.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_removing_support_wakes_bodies() {
        let mut world = PhysicsWorld::default();
        let ground = world
            .create(BodyKind::Fixed, Shape::cuboid(Vec3::new(5.0, 0.25, 5.0)), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        let crate_box = world
            .create(BodyKind::Dynamic, unit_box(), Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY)
            .unwrap();
        for _ in 0..180 {
            world.step(1.0 / 60.0);
        }
        let rest_y = world.get(crate_box).unwrap().position.y;

        world.remove(ground).unwrap();
        world.step(1.0 / 60.0);
        assert!(world.get(crate_box).unwrap().position.y < rest_y);
    }

    #[test]
    fn test_two_dynamic_spheres_push_apart() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let a = world
            .create(BodyKind::Dynamic, Shape::sphere(0.5), Vec3::ZERO, Quat::IDENTITY)
            .unwrap();
        let b = world
            .create(BodyKind::Dynamic, Shape::sphere(0.5), Vec3::new(0.8, 0.0, 0.0), Quat::IDENTITY)
            .unwrap();

        world.step(1.0 / 60.0);

        let pa = world.get(a).unwrap().position;
        let pb = world.get(b).unwrap().position;
        assert!(pa.x < 0.0);
        assert!(pb.x > 0.8);
        assert!((pa.x + (pb.x - 0.8)).abs() < 1e-5, "equal masses move equally");
    }
}
