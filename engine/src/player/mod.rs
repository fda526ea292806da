//! Player Module
//!
//! Keyboard control of the player body.
//!
//! # Components
//!
//! - [`ImpulseController`] - Maps held movement keys to one impulse per tick
//! - [`ImpulseSink`] - Seam between the controller and whatever owns the bodies

pub mod impulse_controller;

pub use impulse_controller::{DEFAULT_IMPULSE_STEP, ImpulseController, ImpulseSink};
