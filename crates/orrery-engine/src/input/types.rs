use std::fmt;

/// Keys the viewer binds. Everything else arrives as `Unknown` with the
/// platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,

    W,
    A,
    S,
    D,
    N,
    C,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// `=` / `+` on the main row.
    Equal,
    Minus,
    NumpadAdd,
    NumpadSubtract,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

/// Logical pixels treated as one wheel line.
pub const PIXELS_PER_LINE: f32 = 40.0;

impl MouseWheelDelta {
    /// Vertical delta in lines; pixel deltas are converted.
    pub fn lines_y(&self) -> f32 {
        match *self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / PIXELS_PER_LINE,
        }
    }
}

/// Mouse button transition at the last known pointer position, in logical
/// pixels from the top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    PointerButton(PointerButtonEvent),

    MouseWheel(MouseWheelDelta),
}

impl InputEvent {
    /// Returns the key of a press event, repeats included.
    pub fn key_press(&self) -> Option<Key> {
        match *self {
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                ..
            } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_pixels_convert_to_lines() {
        assert_eq!(MouseWheelDelta::Line { x: 0.0, y: -2.0 }.lines_y(), -2.0);
        assert_eq!(MouseWheelDelta::Pixel { x: 0.0, y: 80.0 }.lines_y(), 2.0);
    }

    #[test]
    fn key_press_includes_repeats() {
        let key = |state, repeat| InputEvent::Key {
            key: Key::W,
            state,
            repeat,
        };
        assert_eq!(key(KeyState::Pressed, false).key_press(), Some(Key::W));
        assert_eq!(key(KeyState::Pressed, true).key_press(), Some(Key::W));
        assert_eq!(key(KeyState::Released, false).key_press(), None);
        assert_eq!(InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }).key_press(), None);
    }
}
