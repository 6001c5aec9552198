// Logical actions and the discrete edges the simulation consumes

use winit::keyboard::KeyCode;

/// Everything a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Locomotion
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,

    // Combat
    Attack,

    // Meta actions, handled by the shell rather than the simulation
    Pause,
    Quit,
}

/// Represents an input source (only the keyboard for now)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

/// Discrete press/release edges fed to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameInput {
    MoveForwardDown,
    MoveForwardUp,
    MoveBackwardDown,
    MoveBackwardUp,
    TurnLeftDown,
    TurnLeftUp,
    TurnRightDown,
    TurnRightUp,
    AttackDown,
}

impl GameInput {
    /// Edge produced when `action` is pressed (`pressed == true`) or released.
    /// Releasing attack and the meta actions produce nothing.
    pub fn from_edge(action: Action, pressed: bool) -> Option<Self> {
        let input = match (action, pressed) {
            (Action::MoveForward, true) => Self::MoveForwardDown,
            (Action::MoveForward, false) => Self::MoveForwardUp,
            (Action::MoveBackward, true) => Self::MoveBackwardDown,
            (Action::MoveBackward, false) => Self::MoveBackwardUp,
            (Action::TurnLeft, true) => Self::TurnLeftDown,
            (Action::TurnLeft, false) => Self::TurnLeftUp,
            (Action::TurnRight, true) => Self::TurnRightDown,
            (Action::TurnRight, false) => Self::TurnRightUp,
            (Action::Attack, true) => Self::AttackDown,
            _ => return None,
        };
        Some(input)
    }
}

/// Default keyboard layout: arrow keys to move, Control to throw
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        (InputSource::key(KeyCode::ArrowUp), Action::MoveForward),
        (InputSource::key(KeyCode::ArrowDown), Action::MoveBackward),
        (InputSource::key(KeyCode::ArrowLeft), Action::TurnLeft),
        (InputSource::key(KeyCode::ArrowRight), Action::TurnRight),
        (InputSource::key(KeyCode::ControlLeft), Action::Attack),
        (InputSource::key(KeyCode::ControlRight), Action::Attack),
        (InputSource::key(KeyCode::KeyP), Action::Pause),
        (InputSource::key(KeyCode::Escape), Action::Quit),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_edges() {
        assert_eq!(
            GameInput::from_edge(Action::MoveForward, true),
            Some(GameInput::MoveForwardDown)
        );
        assert_eq!(
            GameInput::from_edge(Action::TurnRight, false),
            Some(GameInput::TurnRightUp)
        );
        assert_eq!(
            GameInput::from_edge(Action::Attack, true),
            Some(GameInput::AttackDown)
        );
    }

    #[test]
    fn test_attack_release_and_meta_actions_have_no_edge() {
        assert_eq!(GameInput::from_edge(Action::Attack, false), None);
        assert_eq!(GameInput::from_edge(Action::Pause, true), None);
        assert_eq!(GameInput::from_edge(Action::Quit, false), None);
    }

    #[test]
    fn test_default_bindings_cover_every_action() {
        let bindings = default_bindings();
        for action in [
            Action::MoveForward,
            Action::MoveBackward,
            Action::TurnLeft,
            Action::TurnRight,
            Action::Attack,
            Action::Pause,
            Action::Quit,
        ] {
            assert!(bindings.iter().any(|(_, a)| *a == action), "{action:?} unbound");
        }
    }

    #[test]
    fn test_no_duplicate_sources() {
        let mut seen = std::collections::HashSet::new();
        for (source, _) in default_bindings() {
            assert!(seen.insert(source), "Duplicate input source {source:?}");
        }
    }
}
