//! # Input State
//!
//! Per-frame input snapshot types produced by the input manager.

use std::collections::HashMap;
use std::hash::Hash;

use winit::{event::MouseButton, keyboard::KeyCode};

/// Frame-to-frame transition of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Up this frame and the last
    #[default]
    NotPressed,
    /// Went down this frame
    Pressed,
    /// Down this frame and the last
    Held,
    /// Went up this frame
    Released,
}

impl RawInputState {
    /// Pressed or held.
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// The transition between two sampled up/down flags.
    pub fn between(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// Up/down flags of a fixed set of keys or buttons, for this frame and the last.
///
/// Anything outside the tracked set is ignored.
#[derive(Debug, Clone)]
pub struct ButtonStates<T> {
    previous: HashMap<T, bool>,
    current: HashMap<T, bool>,
}

impl<T: Copy + Eq + Hash> ButtonStates<T> {
    /// Tracks `buttons`, all initially up.
    pub fn tracking(buttons: &[T]) -> Self {
        let previous: HashMap<T, bool> = buttons.iter().map(|b| (*b, false)).collect();
        Self {
            current: previous.clone(),
            previous,
        }
    }

    /// Sets the current flag of a tracked button.
    pub fn set(&mut self, button: T, down: bool) {
        if let Some(state) = self.current.get_mut(&button) {
            *state = down;
        }
    }

    /// Starts a new frame: the current flags become the previous ones.
    pub fn advance(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// Puts every tracked button up.
    pub fn release_all(&mut self) {
        self.current.values_mut().for_each(|down| *down = false);
    }

    /// This frame's transition for every tracked button.
    pub fn transitions(&self) -> HashMap<T, RawInputState> {
        self.current
            .iter()
            .map(|(button, &is_down)| {
                let was_down = self.previous.get(button).copied().unwrap_or(false);
                (*button, RawInputState::between(was_down, is_down))
            })
            .collect()
    }
}

/// A snapshot of one frame of input.
pub struct ProcessedInputState {
    /// Transition of every tracked key
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Transition of every tracked mouse button
    pub mouse_button_states: HashMap<MouseButton, RawInputState>,

    /// Accumulated mouse motion (x, y), if the mouse moved
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// State of a key; untracked keys are never pressed.
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    pub fn get_mouse_button_state(&self, button: MouseButton) -> RawInputState {
        self.mouse_button_states.get(&button).copied().unwrap_or_default()
    }

    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }
}
