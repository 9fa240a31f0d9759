use orrery_engine::input::Key;

/// Radians per rotation key press.
pub const ROTATE_STEP: f32 = 0.01;

/// What a key press does to the viewer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Action {
    Rotate { yaw: f32, pitch: f32 },
    Move { dx: f32, dy: f32, dz: f32 },
    TogglePostProcess,
    ToggleCulling,
    Quit,
}

/// Key bindings. Repeats are fed through here too, so a held key keeps
/// acting at the platform repeat rate.
pub fn action_for(key: Key) -> Option<Action> {
    let rotate = |yaw, pitch| Some(Action::Rotate { yaw, pitch });
    let step = |dx, dy, dz| Some(Action::Move { dx, dy, dz });
    match key {
        Key::W => rotate(0.0, ROTATE_STEP),
        Key::S => rotate(0.0, -ROTATE_STEP),
        Key::A => rotate(-ROTATE_STEP, 0.0),
        Key::D => rotate(ROTATE_STEP, 0.0),

        Key::ArrowLeft => step(-1.0, 0.0, 0.0),
        Key::ArrowRight => step(1.0, 0.0, 0.0),
        Key::ArrowUp => step(0.0, 1.0, 0.0),
        Key::ArrowDown => step(0.0, -1.0, 0.0),
        Key::Equal | Key::NumpadAdd => step(0.0, 0.0, 1.0),
        Key::Minus | Key::NumpadSubtract => step(0.0, 0.0, -1.0),

        Key::N => Some(Action::TogglePostProcess),
        Key::C => Some(Action::ToggleCulling),
        Key::Escape => Some(Action::Quit),
        _ => None,
    }
}

/// Mouse wheel dolly: one line moves one step along z.
pub fn wheel_action(lines: f32) -> Option<Action> {
    if lines == 0.0 || !lines.is_finite() {
        return None;
    }
    Some(Action::Move {
        dx: 0.0,
        dy: 0.0,
        dz: lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_keys_are_symmetric() {
        let Some(Action::Rotate { yaw: a, .. }) = action_for(Key::A) else {
            panic!("A is not a rotation");
        };
        let Some(Action::Rotate { yaw: d, .. }) = action_for(Key::D) else {
            panic!("D is not a rotation");
        };
        assert_eq!(a, -d);
        assert_eq!(
            action_for(Key::W),
            Some(Action::Rotate { yaw: 0.0, pitch: ROTATE_STEP })
        );
    }

    #[test]
    fn both_plus_keys_dolly_forward() {
        let forward = Some(Action::Move { dx: 0.0, dy: 0.0, dz: 1.0 });
        assert_eq!(action_for(Key::Equal), forward);
        assert_eq!(action_for(Key::NumpadAdd), forward);
        assert_eq!(
            action_for(Key::Minus),
            Some(Action::Move { dx: 0.0, dy: 0.0, dz: -1.0 })
        );
    }

    #[test]
    fn toggles_and_unbound_keys() {
        assert_eq!(action_for(Key::N), Some(Action::TogglePostProcess));
        assert_eq!(action_for(Key::C), Some(Action::ToggleCulling));
        assert_eq!(action_for(Key::Escape), Some(Action::Quit));
        assert_eq!(action_for(Key::Unknown(0)), None);
    }

    #[test]
    fn wheel_ignores_zero() {
        assert_eq!(wheel_action(0.0), None);
        assert_eq!(
            wheel_action(-2.0),
            Some(Action::Move { dx: 0.0, dy: 0.0, dz: -2.0 })
        );
    }
}
