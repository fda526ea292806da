//! Input Tests - Key Mapping, Controller Impulses and Cross-Thread Input
//!
//! Drives the player controller with real key sequences against a physics
//! world and checks the resulting motion.

use drop_box_engine::input::{InputState, KeyCode, MovementKey, SharedInputState};
use drop_box_engine::physics::{BodyDesc, BodyHandle, PhysicsResult, PhysicsWorld, Shape, Vec3};
use drop_box_engine::player::{ImpulseController, ImpulseSink};

const DT: f32 = 1.0 / 60.0;

/// Zero-gravity world holding one unit-mass player box.
fn floating_player() -> (PhysicsWorld, BodyHandle) {
    let mut world = PhysicsWorld::new(Vec3::ZERO);
    let player = world
        .create_with(BodyDesc::dynamic(Shape::cuboid(Vec3::splat(0.5))))
        .unwrap();
    (world, player)
}

struct CountingSink {
    calls: usize,
}

impl ImpulseSink for CountingSink {
    fn apply_impulse(&mut self, _handle: BodyHandle, _impulse: Vec3) -> PhysicsResult<()> {
        self.calls += 1;
        Ok(())
    }
}

// ============================================================================
// Key Mapping
// ============================================================================

#[test]
fn test_letter_and_arrow_keys_are_equivalent() {
    let pairs = [
        ("w", "ArrowUp", MovementKey::Forward),
        ("s", "ArrowDown", MovementKey::Backward),
        ("a", "ArrowLeft", MovementKey::Left),
        ("d", "ArrowRight", MovementKey::Right),
    ];

    for (letter, arrow, direction) in pairs {
        let mut by_letter = InputState::new();
        by_letter.handle_named_key(letter, true);
        let mut by_arrow = InputState::new();
        by_arrow.handle_named_key(arrow, true);

        assert!(by_letter.is_pressed(direction), "{letter}");
        assert!(by_arrow.is_pressed(direction), "{arrow}");

        let controller = ImpulseController::new(BodyHandle::default());
        assert_eq!(
            controller.compute_impulse(&by_letter),
            controller.compute_impulse(&by_arrow)
        );
    }
}

#[test]
fn test_uppercase_key_names_match() {
    let mut input = InputState::new();
    input.handle_named_key("W", true);
    assert!(input.is_pressed(MovementKey::Forward));
    input.handle_named_key("w", false);
    assert!(!input.any_pressed());
}

#[test]
fn test_key_repeat_does_not_accumulate() {
    let (mut world, player) = floating_player();
    let controller = ImpulseController::new(player);

    let mut input = InputState::new();
    for _ in 0..10 {
        input.on_key_down(KeyCode::D);
    }
    controller.update(&input, &mut world).unwrap();

    let velocity = world.get(player).unwrap().linear_velocity;
    assert!((velocity.x - 0.1).abs() < 1e-6);
}

// ============================================================================
// Controller Against the World
// ============================================================================

#[test]
fn test_holding_key_accelerates_player() {
    let (mut world, player) = floating_player();
    let controller = ImpulseController::new(player);
    let mut input = InputState::new();
    input.on_key_down(KeyCode::ArrowRight);

    for _ in 0..30 {
        controller.update(&input, &mut world).unwrap();
        world.step(DT);
    }

    let state = world.get(player).unwrap();
    assert!((state.linear_velocity.x - 3.0).abs() < 1e-4);
    assert!(state.position.x > 0.0);
    assert_eq!(state.position.z, 0.0);
}

#[test]
fn test_diagonal_impulse_magnitude() {
    let (mut world, player) = floating_player();
    let controller = ImpulseController::new(player);
    let mut input = InputState::new();
    input.on_key_down(KeyCode::W);
    input.on_key_down(KeyCode::D);

    let impulse = controller.update(&input, &mut world).unwrap().unwrap();
    assert!((impulse.length() - 0.1 * std::f32::consts::SQRT_2).abs() < 1e-6);

    let velocity = world.get(player).unwrap().linear_velocity;
    assert!(velocity.x > 0.0 && velocity.z < 0.0);
}

#[test]
fn test_released_keys_stop_impulses() {
    let controller = ImpulseController::new(BodyHandle::default());
    let mut sink = CountingSink { calls: 0 };
    let mut input = InputState::new();

    input.on_key_down(KeyCode::S);
    controller.update(&input, &mut sink).unwrap();
    input.on_key_up(KeyCode::S);
    for _ in 0..10 {
        assert_eq!(controller.update(&input, &mut sink).unwrap(), None);
    }
    assert_eq!(sink.calls, 1);
}

#[test]
fn test_heavier_player_moves_slower() {
    let mut world = PhysicsWorld::new(Vec3::ZERO);
    let light = world
        .create_with(BodyDesc::dynamic(Shape::cuboid(Vec3::splat(0.5))))
        .unwrap();
    let heavy = world
        .create_with(
            BodyDesc::dynamic(Shape::cuboid(Vec3::splat(0.5)))
                .at(Vec3::new(10.0, 0.0, 0.0))
                .with_density(4.0),
        )
        .unwrap();

    let mut input = InputState::new();
    input.on_key_down(KeyCode::A);
    ImpulseController::new(light).update(&input, &mut world).unwrap();
    ImpulseController::new(heavy).update(&input, &mut world).unwrap();

    let light_v = world.get(light).unwrap().linear_velocity.x;
    let heavy_v = world.get(heavy).unwrap().linear_velocity.x;
    assert!((light_v - 4.0 * heavy_v).abs() < 1e-6);
}

// ============================================================================
// Shared Input
// ============================================================================

#[test]
fn test_shared_input_from_another_thread() {
    let shared = SharedInputState::new();
    let writer = shared.clone();

    std::thread::spawn(move || {
        writer.handle_named_key("ArrowUp", true);
        writer.handle_named_key("a", true);
    })
    .join()
    .unwrap();

    let (mut world, player) = floating_player();
    let controller = ImpulseController::new(player);
    let impulse = controller.update(&shared.snapshot(), &mut world).unwrap();
    assert_eq!(impulse, Some(Vec3::new(-0.1, 0.0, -0.1)));

    shared.reset();
    assert_eq!(controller.update(&shared.snapshot(), &mut world).unwrap(), None);
}
