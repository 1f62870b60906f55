//! # Input Manager
//!
//! Tracks keyboard and mouse state between frames and turns raw window
//! events into per-frame [`ProcessedInputState`] snapshots.

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ButtonStates, ProcessedInputState};

/// Keys the viewer reacts to: movement plus the culling, meshing and buffer-log toggles.
const KEY_CODES: [KeyCode; 9] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::KeyC,
    KeyCode::KeyM,
    KeyCode::KeyB,
    KeyCode::Space,
    KeyCode::ShiftLeft,
];

const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Collects input events between frames.
pub struct InputManager {
    keys: ButtonStates<KeyCode>,
    mouse_buttons: ButtonStates<MouseButton>,
    /// Motion accumulated since the last snapshot
    mouse_delta: Option<(f64, f64)>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates an input manager with every tracked key and button released.
    pub fn new() -> Self {
        Self {
            keys: ButtonStates::tracking(&KEY_CODES),
            mouse_buttons: ButtonStates::tracking(&MOUSE_BUTTONS),
            mouse_delta: None,
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                self.mouse_buttons.set(*button, *state == ElementState::Pressed)
            }
            _ => {}
        }
    }

    /// Records a key transition. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.keys.set(key, pressed);
    }

    /// Accumulates mouse movement since the last frame.
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// This frame's input, without starting the next frame.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: self.keys.transitions(),
            mouse_button_states: self.mouse_buttons.transitions(),
            mouse_delta: self.mouse_delta,
        }
    }

    /// Returns this frame's processed input and starts the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Starts a new frame: current states become previous, motion is cleared.
    pub fn reset_inputs(&mut self) {
        self.keys.advance();
        self.mouse_buttons.advance();
        self.mouse_delta = None;
    }

    /// Releases every key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys.release_all();
        self.mouse_buttons.release_all();
        self.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_state::input_state::RawInputState;

    #[test]
    fn key_goes_through_press_hold_release() {
        let mut manager = InputManager::new();

        manager.set_key(KeyCode::KeyC, true);
        let first = manager.get_and_reset_processed_input();
        assert!(first.get_key_state(KeyCode::KeyC).is_just_pressed());

        let second = manager.get_and_reset_processed_input();
        assert_eq!(second.get_key_state(KeyCode::KeyC), RawInputState::Held);

        manager.set_key(KeyCode::KeyC, false);
        let third = manager.get_and_reset_processed_input();
        assert!(third.get_key_state(KeyCode::KeyC).is_just_released());
    }

    #[test]
    fn untracked_keys_stay_not_pressed() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyZ, true);
        let input = manager.create_processed_input_state();
        assert_eq!(input.get_key_state(KeyCode::KeyZ), RawInputState::NotPressed);
    }

    #[test]
    fn mouse_motion_accumulates_within_a_frame() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((1.0, 2.0));
        manager.intake_mouse_motion((3.0, -1.0));
        let input = manager.get_and_reset_processed_input();
        assert_eq!(input.get_mouse_delta(), Some((4.0, 1.0)));
        assert_eq!(manager.create_processed_input_state().get_mouse_delta(), None);
    }

    #[test]
    fn losing_focus_releases_held_keys() {
        let mut manager = InputManager::new();
        manager.set_key(KeyCode::KeyW, true);
        manager.get_and_reset_processed_input();

        manager.release_all();
        let input = manager.get_and_reset_processed_input();
        assert!(input.get_key_state(KeyCode::KeyW).is_just_released());
    }
}
