use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::input::{
    InputEvent, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent,
};

/// Turns winit window events into `InputEvent`s.
///
/// winit reports button presses without a position, so the cursor is
/// tracked here and attached to each button event.
#[derive(Debug, Default)]
pub(crate) struct EventTranslator {
    pointer: Option<(f32, f32)>,
}

impl EventTranslator {
    /// Returns `None` for events the viewer has no use for. Cursor motion
    /// only updates the tracked position.
    pub fn translate(&mut self, window: &Window, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = Some(to_logical_f32(window, *position));
                None
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                None
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.button_event(map_mouse_button(*button), map_button_state(*state))
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                    MouseScrollDelta::PixelDelta(p) => {
                        let (x, y) = to_logical_f32(window, *p);
                        MouseWheelDelta::Pixel { x, y }
                    }
                };
                Some(InputEvent::MouseWheel(delta))
            }

            WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state: match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                },
                repeat: event.repeat,
            }),

            _ => None,
        }
    }

    /// Buttons pressed before the cursor entered the window are dropped.
    fn button_event(&self, button: MouseButton, state: MouseButtonState) -> Option<InputEvent> {
        let (x, y) = self.pointer?;
        Some(InputEvent::PointerButton(PointerButtonEvent { button, state, x, y }))
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x as f32, logical.y as f32)
}

fn map_button_state(state: ElementState) -> MouseButtonState {
    match state {
        ElementState::Pressed => MouseButtonState::Pressed,
        ElementState::Released => MouseButtonState::Released,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyC => Key::C,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Equal => Key::Equal,
        KeyCode::Minus => Key::Minus,
        KeyCode::NumpadAdd => Key::NumpadAdd,
        KeyCode::NumpadSubtract => Key::NumpadSubtract,
        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_keys_are_mapped() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Equal)), Key::Equal);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadSubtract)), Key::NumpadSubtract);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyN)), Key::N);
    }

    #[test]
    fn unbound_keys_keep_their_code() {
        let key = map_key(PhysicalKey::Code(KeyCode::CapsLock));
        assert_eq!(key, Key::Unknown(KeyCode::CapsLock as u32));
    }

    #[test]
    fn clicks_carry_the_tracked_position() {
        let mut translator = EventTranslator::default();
        assert_eq!(translator.button_event(MouseButton::Left, MouseButtonState::Pressed), None);

        translator.pointer = Some((4.0, 5.0));
        assert_eq!(
            translator.button_event(MouseButton::Left, MouseButtonState::Pressed),
            Some(InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 4.0,
                y: 5.0,
            }))
        );
    }
}
