//! Scene Module
//!
//! Ties the pieces together: a [`Simulation`] owns the physics world, the
//! player controller and the fixed-timestep clock, and exposes a single
//! [`Simulation::tick`] that hosts call once per frame.
//!
//! # Tick Order
//!
//! 1. The controller samples the input state and impulses the player
//! 2. The world steps by `dt`
//!
//! # Example
//!
//! ```rust
//! use drop_box_engine::input::{InputState, KeyCode};
//! use drop_box_engine::scene::{SceneConfig, Simulation};
//!
//! let mut sim = Simulation::from_config(&SceneConfig::default()).unwrap();
//! let mut input = InputState::new();
//! input.on_key_down(KeyCode::D);
//!
//! let report = sim.tick(&input, 1.0 / 60.0);
//! assert!(report.impulse.is_some());
//! ```

pub mod clock;
pub mod config;
pub mod error;

pub use clock::FixedTimestep;
pub use config::{BodyRole, BodySpec, PlayerConfig, SceneConfig};
pub use error::{SceneError, SceneResult};

use glam::Vec3;

use crate::input::InputState;
use crate::physics::{BodyHandle, BodyState, PhysicsError, PhysicsWorld, StepReport};
use crate::player::ImpulseController;
use crate::render::{BodyInstance, pack_color_f32};

/// A body created from a [`BodySpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBody {
    pub handle: BodyHandle,
    pub name: String,
    pub role: BodyRole,
    pub color: [f32; 3],
}

/// Outcome of one [`Simulation::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Impulse applied to the player, `None` when no key was held
    pub impulse: Option<Vec3>,
    /// Controller failure; the step still ran
    pub controller_error: Option<PhysicsError>,
    pub step: StepReport,
}

/// The running scene.
pub struct Simulation {
    world: PhysicsWorld,
    controller: ImpulseController,
    clock: FixedTimestep,
    bodies: Vec<SceneBody>,
    ticks: u64,
}

impl Simulation {
    /// Build the world described by `config`.
    pub fn from_config(config: &SceneConfig) -> SceneResult<Self> {
        config.validate()?;

        let mut world = PhysicsWorld::with_config(config.gravity, config.physics.clone());
        let mut bodies = Vec::with_capacity(config.bodies.len());
        let mut player = None;

        for spec in &config.bodies {
            let handle = world
                .create_with(spec.to_desc())
                .map_err(|source| SceneError::Body {
                    name: spec.name.clone(),
                    source,
                })?;
            if spec.role == BodyRole::Player {
                player = Some(handle);
            }
            bodies.push(SceneBody {
                handle,
                name: spec.name.clone(),
                role: spec.role,
                color: spec.color,
            });
        }

        let player = player.ok_or(SceneError::MissingPlayer)?;
        log::info!(
            "scene ready: {} bodies, gravity {}, tick {:.4}s",
            bodies.len(),
            config.gravity,
            config.fixed_timestep
        );

        Ok(Self {
            world,
            controller: ImpulseController::with_impulse_step(player, config.player.impulse_step),
            clock: FixedTimestep::new(config.fixed_timestep, config.max_ticks_per_frame),
            bodies,
            ticks: 0,
        })
    }

    /// Apply player input, then step the world by `dt`.
    pub fn tick(&mut self, input: &InputState, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        match self.controller.update(input, &mut self.world) {
            Ok(impulse) => report.impulse = impulse,
            Err(err) => report.controller_error = Some(err),
        }
        report.step = self.world.step(dt);
        self.ticks += 1;
        report
    }

    /// Feed wall-clock frame time and run as many fixed ticks as it covers.
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, input: &InputState, frame_dt: f32) -> usize {
        let ticks = self.clock.accumulate(frame_dt);
        let dt = self.clock.step();
        for _ in 0..ticks {
            self.tick(input, dt);
        }
        ticks as usize
    }

    pub fn player(&self) -> BodyHandle {
        self.controller.player()
    }

    pub fn player_state(&self) -> Option<BodyState> {
        self.world.get(self.controller.player())
    }

    pub fn controller(&self) -> &ImpulseController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ImpulseController {
        &mut self.controller
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn clock(&self) -> &FixedTimestep {
        &self.clock
    }

    /// Scene bodies in config order.
    pub fn bodies(&self) -> &[SceneBody] {
        &self.bodies
    }

    /// First body with the given name.
    pub fn find(&self, name: &str) -> Option<BodyHandle> {
        self.bodies.iter().find(|body| body.name == name).map(|body| body.handle)
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Per-body GPU records for the current state, in scene colors.
    pub fn instances(&self) -> Vec<BodyInstance> {
        self.bodies
            .iter()
            .filter_map(|scene_body| {
                let body = self.world.bodies().body(scene_body.handle)?;
                Some(BodyInstance::from_body(body, pack_color_f32(scene_body.color)))
            })
            .collect()
    }
}
