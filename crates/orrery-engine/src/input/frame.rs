use super::types::{InputEvent, Key};

/// Input events collected since the previous frame, in arrival order.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    /// Key presses in arrival order, repeats included.
    pub fn key_presses(&self) -> impl Iterator<Item = Key> + '_ {
        self.events.iter().filter_map(InputEvent::key_press)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyState;

    #[test]
    fn held_key_repeats_count_as_presses() {
        let mut frame = InputFrame::default();
        for (state, repeat) in [
            (KeyState::Pressed, false),
            (KeyState::Pressed, true),
            (KeyState::Pressed, true),
            (KeyState::Released, false),
        ] {
            frame.push_event(InputEvent::Key { key: Key::A, state, repeat });
        }
        assert_eq!(frame.key_presses().collect::<Vec<_>>(), vec![Key::A; 3]);

        frame.clear();
        assert_eq!(frame.key_presses().count(), 0);
    }
}
