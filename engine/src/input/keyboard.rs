//! Keyboard Input Module
//!
//! Tracks which movement keys are held. Decoupled from winit to use generic
//! key codes; hosts translate their own events into [`KeyCode`] values.
//!
//! Every physical key has its own bit, so releasing `W` while `ArrowUp` is
//! still held keeps [`MovementKey::Forward`] pressed.

/// Generic key codes, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Movement keys
    W,
    A,
    S,
    D,

    // Arrow keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Escape,

    /// Catch-all for unhandled keys
    Unknown,
}

impl KeyCode {
    /// Parse a DOM-style key name (`"w"`, `"ArrowUp"`, `"Escape"`).
    ///
    /// Matching is case-insensitive. Unrecognised names map to [`KeyCode::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "w" | "keyw" => Self::W,
            "a" | "keya" => Self::A,
            "s" | "keys" => Self::S,
            "d" | "keyd" => Self::D,
            "arrowup" => Self::ArrowUp,
            "arrowdown" => Self::ArrowDown,
            "arrowleft" => Self::ArrowLeft,
            "arrowright" => Self::ArrowRight,
            "escape" | "esc" => Self::Escape,
            _ => Self::Unknown,
        }
    }

    /// Bit tracked for this key, `None` for keys that do not move the player.
    pub(crate) fn bit(self) -> Option<u8> {
        let bit = match self {
            Self::W => 1 << 0,
            Self::S => 1 << 1,
            Self::A => 1 << 2,
            Self::D => 1 << 3,
            Self::ArrowUp => 1 << 4,
            Self::ArrowDown => 1 << 5,
            Self::ArrowLeft => 1 << 6,
            Self::ArrowRight => 1 << 7,
            Self::Escape | Self::Unknown => return None,
        };
        Some(bit)
    }

    /// The logical direction this key drives, if any.
    pub fn movement(self) -> Option<MovementKey> {
        match self {
            Self::W | Self::ArrowUp => Some(MovementKey::Forward),
            Self::S | Self::ArrowDown => Some(MovementKey::Backward),
            Self::A | Self::ArrowLeft => Some(MovementKey::Left),
            Self::D | Self::ArrowRight => Some(MovementKey::Right),
            Self::Escape | Self::Unknown => None,
        }
    }
}

/// Logical movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKey {
    /// -Z
    Forward,
    /// +Z
    Backward,
    /// -X
    Left,
    /// +X
    Right,
}

impl MovementKey {
    pub const ALL: [MovementKey; 4] = [
        MovementKey::Forward,
        MovementKey::Backward,
        MovementKey::Left,
        MovementKey::Right,
    ];

    /// Bits of every physical key bound to this direction.
    fn mask(self) -> u8 {
        match self {
            MovementKey::Forward => (1 << 0) | (1 << 4),
            MovementKey::Backward => (1 << 1) | (1 << 5),
            MovementKey::Left => (1 << 2) | (1 << 6),
            MovementKey::Right => (1 << 3) | (1 << 7),
        }
    }
}

/// Set of currently held movement keys.
///
/// Key events are idempotent: a repeated key-down for a held key changes nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: u8,
}

impl InputState {
    /// Create a new input state with all keys released.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_bits(held: u8) -> Self {
        Self { held }
    }

    /// Record a key press. Returns `false` for keys that are not movement keys.
    pub fn on_key_down(&mut self, key: KeyCode) -> bool {
        match key.bit() {
            Some(bit) => {
                self.held |= bit;
                true
            }
            None => false,
        }
    }

    /// Record a key release. Returns `false` for keys that are not movement keys.
    pub fn on_key_up(&mut self, key: KeyCode) -> bool {
        match key.bit() {
            Some(bit) => {
                self.held &= !bit;
                true
            }
            None => false,
        }
    }

    /// Update state based on key press/release.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        if pressed {
            self.on_key_down(key)
        } else {
            self.on_key_up(key)
        }
    }

    /// Same as [`handle_key`](Self::handle_key) with a DOM-style key name.
    pub fn handle_named_key(&mut self, name: &str, pressed: bool) -> bool {
        self.handle_key(KeyCode::from_name(name), pressed)
    }

    /// A direction is pressed while any of its keys is held.
    pub fn is_pressed(&self, key: MovementKey) -> bool {
        self.held & key.mask() != 0
    }

    /// Whether this exact physical key is held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        key.bit().is_some_and(|bit| self.held & bit != 0)
    }

    /// Check if any movement key is currently pressed.
    pub fn any_pressed(&self) -> bool {
        self.held != 0
    }

    /// Reset all movement keys to released state.
    pub fn reset(&mut self) {
        self.held = 0;
    }

    /// Get the forward/backward movement direction (-1, 0, or 1).
    pub fn forward_axis(&self) -> i32 {
        self.is_pressed(MovementKey::Forward) as i32 - self.is_pressed(MovementKey::Backward) as i32
    }

    /// Get the left/right movement direction (-1, 0, or 1).
    pub fn right_axis(&self) -> i32 {
        self.is_pressed(MovementKey::Right) as i32 - self.is_pressed(MovementKey::Left) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        let mut input = InputState::new();

        assert!(input.on_key_down(KeyCode::W));
        assert!(input.is_pressed(MovementKey::Forward));
        assert_eq!(input.forward_axis(), 1);

        input.on_key_down(KeyCode::S);
        assert_eq!(input.forward_axis(), 0);

        input.on_key_up(KeyCode::W);
        assert_eq!(input.forward_axis(), -1);
    }

    #[test]
    fn test_aliases_are_tracked_separately() {
        let mut input = InputState::new();
        input.on_key_down(KeyCode::W);
        input.on_key_down(KeyCode::ArrowUp);

        input.on_key_up(KeyCode::W);
        assert!(input.is_pressed(MovementKey::Forward));
        assert!(!input.is_key_held(KeyCode::W));
        assert!(input.is_key_held(KeyCode::ArrowUp));

        input.on_key_up(KeyCode::ArrowUp);
        assert!(!input.is_pressed(MovementKey::Forward));
    }

    #[test]
    fn test_repeated_key_down_is_idempotent() {
        let mut once = InputState::new();
        once.on_key_down(KeyCode::D);

        let mut many = InputState::new();
        for _ in 0..5 {
            many.on_key_down(KeyCode::D);
        }
        assert_eq!(once, many);

        many.on_key_up(KeyCode::D);
        assert!(!many.any_pressed());
    }

    #[test]
    fn test_unmapped_keys_ignored() {
        let mut input = InputState::new();
        assert!(!input.on_key_down(KeyCode::Escape));
        assert!(!input.handle_named_key("q", true));
        assert!(!input.any_pressed());
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(KeyCode::from_name("w"), KeyCode::W);
        assert_eq!(KeyCode::from_name("W"), KeyCode::W);
        assert_eq!(KeyCode::from_name("ArrowUp"), KeyCode::ArrowUp);
        assert_eq!(KeyCode::from_name("ARROWLEFT"), KeyCode::ArrowLeft);
        assert_eq!(KeyCode::from_name("Escape"), KeyCode::Escape);
        assert_eq!(KeyCode::from_name("Shift"), KeyCode::Unknown);
    }

    #[test]
    fn test_every_movement_key_has_two_aliases() {
        for key in MovementKey::ALL {
            assert_eq!(key.mask().count_ones(), 2);
        }
    }

    #[test]
    fn test_reset() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::A, true);
        input.handle_key(KeyCode::ArrowRight, true);
        input.reset();
        assert!(!input.any_pressed());
        assert_eq!(input.right_axis(), 0);
    }
}
