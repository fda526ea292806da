//! Input Module
//!
//! Platform-agnostic keyboard state for the movement keys. Decoupled from
//! any specific windowing system (like winit); hosts translate their events
//! into [`KeyCode`] values or DOM-style key names.
//!
//! # Example
//!
//! ```rust
//! use drop_box_engine::input::{InputState, KeyCode, MovementKey};
//!
//! let mut input = InputState::new();
//! input.on_key_down(KeyCode::W);
//! input.handle_named_key("ArrowRight", true);
//!
//! assert!(input.is_pressed(MovementKey::Forward));
//! assert!(input.is_pressed(MovementKey::Right));
//! ```

pub mod keyboard;
pub mod shared;

pub use keyboard::{InputState, KeyCode, MovementKey};
pub use shared::SharedInputState;
