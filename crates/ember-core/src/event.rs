//! Platform events delivered to the active game state.
//!
//! The platform layer translates its native events into [`Event`]; nothing
//! in Ember depends on a specific windowing library.

use crate::geometry::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Left,
    Right,
    Up,
    Down,
    Char(char),
    /// Platform scan code with no named variant.
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Closed,
    Resized(Size<u32>),
    GainedFocus,
    LostFocus,
    KeyPressed(Key),
    KeyReleased(Key),
    MouseMoved { x: f32, y: f32 },
    MouseButtonPressed { button: MouseButton, x: f32, y: f32 },
    MouseButtonReleased { button: MouseButton, x: f32, y: f32 },
}

impl Event {
    /// True for a released key matching `key`.
    pub fn is_key_released(&self, key: Key) -> bool {
        matches!(self, Event::KeyReleased(k) if *k == key)
    }
}
