//! # Input Module
//!
//! Device-independent input events.
//!
//! The rendering shell translates whatever the windowing layer reports
//! into these events; the core only ever sees [`InputEvent`] values routed
//! to the active map state. This keeps the whole input path testable
//! without a window.

/// Logical keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Interact / advance dialog
    Interact,
    /// Cancel / menu
    Cancel,
}

impl Key {
    /// Movement vector for direction keys, None otherwise.
    pub fn movement(self) -> Option<crate::Vec2> {
        match self {
            Key::Up => Some(crate::Vec2::new(0.0, -1.0)),
            Key::Down => Some(crate::Vec2::new(0.0, 1.0)),
            Key::Left => Some(crate::Vec2::new(-1.0, 0.0)),
            Key::Right => Some(crate::Vec2::new(1.0, 0.0)),
            _ => None,
        }
    }
}

/// A discrete keyboard transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(Key::Up.movement(), Some(crate::Vec2::new(0.0, -1.0)));
        assert_eq!(Key::Right.movement(), Some(crate::Vec2::new(1.0, 0.0)));
        assert_eq!(Key::Interact.movement(), None);
    }
}
