// Input manager - turns raw key events into simulation edges

use super::action::{Action, GameInput, InputSource};
use super::config::InputConfig;
use std::collections::{HashSet, VecDeque};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Requests meant for the application shell rather than the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    TogglePause,
    Quit,
}

/// Collects key events between ticks and hands them over in arrival order
pub struct InputManager {
    config: InputConfig,

    /// Keys currently held, used to drop auto-repeat presses
    held: HashSet<KeyCode>,

    /// Edges waiting for the next simulation tick
    pending: VecDeque<GameInput>,

    /// Shell commands waiting for the event loop
    commands: VecDeque<ShellCommand>,
}

impl InputManager {
    /// Create an input manager with the default layout
    pub fn new() -> Self {
        Self::with_config(InputConfig::with_defaults())
    }

    pub fn with_config(config: InputConfig) -> Self {
        Self {
            config,
            held: HashSet::new(),
            pending: VecDeque::new(),
            commands: VecDeque::new(),
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        // Only process physical key presses
        if let PhysicalKey::Code(key_code) = event.physical_key {
            let pressed = event.state == ElementState::Pressed;
            self.process_key(key_code, pressed, event.repeat);
        }
    }

    /// Process one key transition. Repeats of a held key are ignored.
    pub fn process_key(&mut self, code: KeyCode, pressed: bool, repeat: bool) {
        if pressed {
            if repeat || !self.held.insert(code) {
                return;
            }
        } else if !self.held.remove(&code) {
            // Release without a matching press (focus changes, etc.)
            log::trace!("Ignoring release of {code:?} that was never pressed");
            return;
        }

        let Some(action) = self.config.get_action(InputSource::key(code)) else {
            return;
        };

        match (action, pressed) {
            (Action::Pause, true) => self.commands.push_back(ShellCommand::TogglePause),
            (Action::Quit, true) => self.commands.push_back(ShellCommand::Quit),
            _ => {
                if let Some(input) = GameInput::from_edge(action, pressed) {
                    log::trace!("{code:?} -> {input:?}");
                    self.pending.push_back(input);
                }
            }
        }
    }

    /// Take every edge queued since the last call
    pub fn drain(&mut self) -> Vec<GameInput> {
        self.pending.drain(..).collect()
    }

    /// Take the next shell command, if any
    pub fn next_command(&mut self) -> Option<ShellCommand> {
        self.commands.pop_front()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_queue_edges_in_order() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::ArrowUp, true, false);
        manager.process_key(KeyCode::ArrowLeft, true, false);
        manager.process_key(KeyCode::ArrowUp, false, false);

        assert_eq!(
            manager.drain(),
            vec![
                GameInput::MoveForwardDown,
                GameInput::TurnLeftDown,
                GameInput::MoveForwardUp
            ]
        );
        assert!(manager.drain().is_empty());
    }

    #[test]
    fn test_key_repeat_is_ignored() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::ArrowDown, true, false);
        manager.process_key(KeyCode::ArrowDown, true, true);
        manager.process_key(KeyCode::ArrowDown, true, false);

        assert_eq!(manager.drain(), vec![GameInput::MoveBackwardDown]);
    }

    #[test]
    fn test_attack_only_on_press() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::ControlLeft, true, false);
        manager.process_key(KeyCode::ControlLeft, false, false);

        assert_eq!(manager.drain(), vec![GameInput::AttackDown]);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::KeyZ, true, false);
        manager.process_key(KeyCode::KeyZ, false, false);
        assert!(manager.drain().is_empty());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::ArrowRight, false, false);
        assert!(manager.drain().is_empty());
    }

    #[test]
    fn test_meta_actions_become_shell_commands() {
        let mut manager = InputManager::new();
        manager.process_key(KeyCode::KeyP, true, false);
        manager.process_key(KeyCode::Escape, true, false);

        assert!(manager.drain().is_empty());
        assert_eq!(manager.next_command(), Some(ShellCommand::TogglePause));
        assert_eq!(manager.next_command(), Some(ShellCommand::Quit));
        assert_eq!(manager.next_command(), None);
    }

    #[test]
    fn test_remapped_key() {
        let mut config = InputConfig::with_defaults();
        config.bind(InputSource::key(KeyCode::KeyW), Action::MoveForward);
        let mut manager = InputManager::with_config(config);

        manager.process_key(KeyCode::KeyW, true, false);
        assert_eq!(manager.drain(), vec![GameInput::MoveForwardDown]);
    }
}
