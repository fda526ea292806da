//! Drop Box Engine Library
//!
//! A small rigid-body sandbox: a fixed ground slab, a few falling bodies and
//! one player box pushed around with the keyboard. Rendering and windowing
//! belong to the host; this library owns the simulation.
//!
//! # Modules
//!
//! - [`physics`] - Body registry, collision detection and the stepping world
//! - [`input`] - Platform-agnostic movement key state
//! - [`player`] - Keyboard-to-impulse controller for the player body
//! - [`scene`] - Scene configuration, fixed-timestep clock and the `Simulation` tick
//! - [`render`] - GPU-ready per-body instance records
//!
//! # Example
//!
//! ```rust
//! use drop_box_engine::{InputState, KeyCode, SceneConfig, Simulation};
//!
//! let mut sim = Simulation::from_config(&SceneConfig::default()).unwrap();
//! let mut input = InputState::new();
//!
//! // Key events from the host
//! input.handle_named_key("ArrowUp", true);
//!
//! // Once per frame
//! sim.advance(&input, 1.0 / 60.0);
//! let player = sim.player_state().unwrap();
//! assert!(player.position.y < 5.0);
//! ```

pub mod input;
pub mod physics;
pub mod player;
pub mod render;
pub mod scene;

// Re-export commonly used input types
pub use input::{InputState, KeyCode, MovementKey, SharedInputState};
// Re-export physics types
pub use physics::{BodyDesc, BodyHandle, BodyKind, BodyState, PhysicsError, PhysicsWorld, Shape};
// Re-export player types
pub use player::ImpulseController;
// Re-export scene types
pub use scene::{SceneConfig, SceneError, Simulation, TickReport};
