//! Rigid body registry
//!
//! Owns every body in the world behind generation-tagged handles. A handle
//! stays valid until its body is removed; afterwards every lookup through it
//! reports "not found", even once the slot has been reused by a new body.

use glam::{Quat, Vec3};
use slotmap::SlotMap;

use super::body::{BodyDesc, BodyKind, BodyState, RigidBody, Shape};
use super::error::{PhysicsError, PhysicsResult};

slotmap::new_key_type! {
    /// Opaque, generation-tagged reference to a body owned by a [`BodyRegistry`].
    pub struct BodyHandle;
}

/// Storage for all rigid bodies of a world.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: SlotMap<BodyHandle, RigidBody>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a body from its kind, shape and pose with default density and material.
    pub fn create(
        &mut self,
        kind: BodyKind,
        shape: Shape,
        position: Vec3,
        orientation: Quat,
    ) -> PhysicsResult<BodyHandle> {
        self.create_with(
            BodyDesc::new(kind, shape)
                .at(position)
                .with_orientation(orientation),
        )
    }

    /// Create a body from a full description. The registry is untouched on error.
    pub fn create_with(&mut self, desc: BodyDesc) -> PhysicsResult<BodyHandle> {
        let body = RigidBody::from_desc(&desc)?;
        let handle = self.bodies.insert(body);
        log::debug!(
            "created {:?} {:?} body {:?} at {}",
            desc.kind,
            desc.shape,
            handle,
            desc.position
        );
        Ok(handle)
    }

    /// Snapshot of a body, `None` for stale or unknown handles.
    pub fn get(&self, handle: BodyHandle) -> Option<BodyState> {
        self.bodies.get(handle).map(RigidBody::state)
    }

    /// Borrow a body directly.
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub(crate) fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Apply an instantaneous linear impulse (N·s) at the center of mass.
    ///
    /// Wakes a sleeping body. Fixed bodies are left untouched and reported
    /// with [`PhysicsError::NotDynamic`].
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
        let body = self.dynamic_body_mut(handle)?;
        body.linear_velocity += impulse * body.inv_mass;
        body.wake_up();
        Ok(())
    }

    /// Apply an instantaneous angular impulse (N·m·s).
    pub fn apply_angular_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
        let body = self.dynamic_body_mut(handle)?;
        body.angular_velocity += body.world_inverse_inertia() * impulse;
        body.wake_up();
        Ok(())
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> PhysicsResult<()> {
        let body = self.dynamic_body_mut(handle)?;
        body.linear_velocity = velocity;
        body.wake_up();
        Ok(())
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> PhysicsResult<()> {
        let body = self.dynamic_body_mut(handle)?;
        body.angular_velocity = velocity;
        body.wake_up();
        Ok(())
    }

    /// Remove a body, invalidating its handle.
    pub fn remove(&mut self, handle: BodyHandle) -> PhysicsResult<RigidBody> {
        let body = self
            .bodies
            .remove(handle)
            .ok_or(PhysicsError::InvalidHandle(handle))?;
        log::debug!("removed body {:?}", handle);
        Ok(body)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over all live bodies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut RigidBody)> {
        self.bodies.iter_mut()
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.keys()
    }

    fn dynamic_body_mut(&mut self, handle: BodyHandle) -> PhysicsResult<&mut RigidBody> {
        let body = self
            .bodies
            .get_mut(handle)
            .ok_or(PhysicsError::InvalidHandle(handle))?;
        if !body.is_dynamic() {
            return Err(PhysicsError::NotDynamic(handle));
        }
        Ok(body)
    }
}
