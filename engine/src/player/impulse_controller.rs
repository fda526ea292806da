//! Player Impulse Controller
//!
//! Turns held movement keys into one linear impulse per tick on the player
//! body. Movement is world-aligned: forward is -Z, right is +X.
//!
//! # Usage
//!
//! ```rust,ignore
//! use drop_box_engine::player::ImpulseController;
//!
//! let controller = ImpulseController::new(player_handle);
//!
//! // Each tick, before stepping the world:
//! controller.update(&input, &mut world)?;
//! world.step(dt);
//! ```

use glam::Vec3;

use crate::input::{InputState, MovementKey};
use crate::physics::{BodyHandle, BodyRegistry, PhysicsResult, PhysicsWorld};

/// Impulse per held direction per tick in N·s
pub const DEFAULT_IMPULSE_STEP: f32 = 0.1;

/// Anything that can receive a linear impulse for a body.
pub trait ImpulseSink {
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()>;
}

impl ImpulseSink for BodyRegistry {
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
        BodyRegistry::apply_impulse(self, handle, impulse)
    }
}

impl ImpulseSink for PhysicsWorld {
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
        PhysicsWorld::apply_impulse(self, handle, impulse)
    }
}

/// Maps movement keys to impulses on a single body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseController {
    player: BodyHandle,
    impulse_step: f32,
}

impl ImpulseController {
    pub fn new(player: BodyHandle) -> Self {
        Self::with_impulse_step(player, DEFAULT_IMPULSE_STEP)
    }

    pub fn with_impulse_step(player: BodyHandle, impulse_step: f32) -> Self {
        Self { player, impulse_step }
    }

    pub fn player(&self) -> BodyHandle {
        self.player
    }

    pub fn impulse_step(&self) -> f32 {
        self.impulse_step
    }

    pub fn set_impulse_step(&mut self, impulse_step: f32) {
        self.impulse_step = impulse_step;
    }

    /// Impulse for the current key set. Diagonals are not normalized.
    pub fn compute_impulse(&self, input: &InputState) -> Vec3 {
        let step = self.impulse_step;
        let axis = |positive: MovementKey, negative: MovementKey| {
            let mut value = 0.0;
            if input.is_pressed(positive) {
                value += step;
            }
            if input.is_pressed(negative) {
                value -= step;
            }
            value
        };

        Vec3::new(
            axis(MovementKey::Right, MovementKey::Left),
            0.0,
            axis(MovementKey::Backward, MovementKey::Forward),
        )
    }

    /// Apply this tick's impulse to the player.
    ///
    /// Returns the impulse applied, or `None` when no key is held (the sink is
    /// not touched then). Failures are logged and returned to the caller.
    pub fn update<S: ImpulseSink + ?Sized>(
        &self,
        input: &InputState,
        sink: &mut S,
    ) -> PhysicsResult<Option<Vec3>> {
        let impulse = self.compute_impulse(input);
        if impulse == Vec3::ZERO {
            return Ok(None);
        }

        if let Err(err) = sink.apply_impulse(self.player, impulse) {
            log::warn!("player impulse {impulse} rejected: {err}");
            return Err(err);
        }
        Ok(Some(impulse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::physics::{BodyDesc, PhysicsError, Shape};
    use slotmap::KeyData;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<(BodyHandle, Vec3)>,
    }

    impl ImpulseSink for RecordingSink {
        fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> PhysicsResult<()> {
            self.calls.push((handle, impulse));
            Ok(())
        }
    }

    fn handle() -> BodyHandle {
        BodyHandle::from(KeyData::from_ffi(1))
    }

    fn input_with(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.on_key_down(*key);
        }
        input
    }

    #[test]
    fn test_single_directions() {
        let controller = ImpulseController::new(handle());
        let cases = [
            (KeyCode::W, Vec3::new(0.0, 0.0, -0.1)),
            (KeyCode::S, Vec3::new(0.0, 0.0, 0.1)),
            (KeyCode::A, Vec3::new(-0.1, 0.0, 0.0)),
            (KeyCode::D, Vec3::new(0.1, 0.0, 0.0)),
        ];
        for (key, expected) in cases {
            assert_eq!(controller.compute_impulse(&input_with(&[key])), expected, "{key:?}");
        }
    }

    #[test]
    fn test_arrow_keys_match_letters() {
        let controller = ImpulseController::new(handle());
        assert_eq!(
            controller.compute_impulse(&input_with(&[KeyCode::ArrowUp])),
            controller.compute_impulse(&input_with(&[KeyCode::W]))
        );
        assert_eq!(
            controller.compute_impulse(&input_with(&[KeyCode::W, KeyCode::ArrowUp])),
            controller.compute_impulse(&input_with(&[KeyCode::W]))
        );
    }

    #[test]
    fn test_diagonal_is_not_normalized() {
        let controller = ImpulseController::new(handle());
        let impulse = controller.compute_impulse(&input_with(&[KeyCode::W, KeyCode::D]));
        assert_eq!(impulse, Vec3::new(0.1, 0.0, -0.1));
        assert!((impulse.length() - 0.1 * 2.0_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let controller = ImpulseController::new(handle());
        let impulse = controller.compute_impulse(&input_with(&[KeyCode::A, KeyCode::D]));
        assert_eq!(impulse, Vec3::ZERO);
    }

    #[test]
    fn test_no_keys_no_sink_call() {
        let controller = ImpulseController::new(handle());
        let mut sink = RecordingSink::default();
        assert_eq!(controller.update(&InputState::new(), &mut sink), Ok(None));
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_one_sink_call_per_update() {
        let controller = ImpulseController::with_impulse_step(handle(), 2.0);
        let mut sink = RecordingSink::default();
        let input = input_with(&[KeyCode::ArrowDown, KeyCode::ArrowLeft]);

        let applied = controller.update(&input, &mut sink).unwrap();
        assert_eq!(applied, Some(Vec3::new(-2.0, 0.0, 2.0)));
        assert_eq!(sink.calls, vec![(handle(), Vec3::new(-2.0, 0.0, 2.0))]);
    }

    #[test]
    fn test_errors_are_returned() {
        let mut registry = BodyRegistry::new();
        let ground = registry.create_with(BodyDesc::fixed(Shape::sphere(1.0))).unwrap();
        let controller = ImpulseController::new(ground);

        let result = controller.update(&input_with(&[KeyCode::W]), &mut registry);
        assert_eq!(result, Err(PhysicsError::NotDynamic(ground)));
    }

    #[test]
    fn test_registry_sink_changes_velocity() {
        let mut registry = BodyRegistry::new();
        let player = registry.create_with(BodyDesc::dynamic(Shape::sphere(0.5))).unwrap();
        let controller = ImpulseController::new(player);

        controller.update(&input_with(&[KeyCode::D]), &mut registry).unwrap();
        let state = registry.get(player).unwrap();
        assert!((state.linear_velocity.x - 0.1 / state.mass).abs() < 1e-6);
    }
}
