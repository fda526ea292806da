//! Shared Input State
//!
//! Lock-free [`InputState`] for hosts whose key events arrive on a different
//! thread than the simulation tick. All eight movement keys live in one
//! `AtomicU8`, so each event is a single read-modify-write and each tick reads
//! one consistent snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use super::keyboard::{InputState, KeyCode, MovementKey};

/// Cloneable handle to a held-key set shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SharedInputState {
    held: Arc<AtomicU8>,
}

impl SharedInputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns `false` for keys that are not movement keys.
    pub fn on_key_down(&self, key: KeyCode) -> bool {
        let Some(bit) = key.bit() else {
            return false;
        };
        self.held.fetch_or(bit, Ordering::AcqRel);
        true
    }

    /// Record a key release. Returns `false` for keys that are not movement keys.
    pub fn on_key_up(&self, key: KeyCode) -> bool {
        let Some(bit) = key.bit() else {
            return false;
        };
        self.held.fetch_and(!bit, Ordering::AcqRel);
        true
    }

    pub fn handle_key(&self, key: KeyCode, pressed: bool) -> bool {
        if pressed {
            self.on_key_down(key)
        } else {
            self.on_key_up(key)
        }
    }

    pub fn handle_named_key(&self, name: &str, pressed: bool) -> bool {
        self.handle_key(KeyCode::from_name(name), pressed)
    }

    pub fn is_pressed(&self, key: MovementKey) -> bool {
        self.snapshot().is_pressed(key)
    }

    /// Copy of the current state, taken once per tick by the simulation.
    pub fn snapshot(&self) -> InputState {
        InputState::from_bits(self.held.load(Ordering::Acquire))
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn reset(&self) {
        self.held.store(0, Ordering::Release);
    }
}
