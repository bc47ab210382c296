//! Keyboard input
//!
//! Key events arrive between frames. Movement is level-triggered (held keys);
//! jump, high jump, pause and restart are edge-triggered and fire once per
//! physical press, ignoring auto-repeat.

use std::collections::HashSet;

use crate::sim::tick::TickInput;

/// Logical game action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    HighJump,
    Pause,
    Restart,
}

/// Map a `KeyboardEvent.code` to an action. Unmapped keys are ignored.
pub fn map_key(code: &str) -> Option<Action> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Action::MoveLeft),
        "ArrowRight" | "KeyD" => Some(Action::MoveRight),
        "Space" | "ArrowUp" | "KeyW" => Some(Action::Jump),
        "KeyQ" | "KeyE" => Some(Action::HighJump),
        "KeyP" | "Escape" => Some(Action::Pause),
        "KeyR" => Some(Action::Restart),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key maps to an action (caller may prevent default)
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(action) = map_key(code) else {
            return false;
        };
        // Auto-repeat keeps the key in `held`; only the first press is an edge
        if self.held.insert(action) {
            self.pressed.insert(action);
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        let Some(action) = map_key(code) else {
            return false;
        };
        self.held.remove(&action);
        true
    }

    /// Inject a one-shot action (auto-pause on blur, UI buttons)
    pub fn press(&mut self, action: Action) {
        self.pressed.insert(action);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Drop everything (window blur: key-ups will never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }

    /// Build the input for one simulation step
    pub fn tick_input(&self, now_ms: f64) -> TickInput {
        TickInput {
            move_left: self.is_held(Action::MoveLeft),
            move_right: self.is_held(Action::MoveRight),
            jump: self.pressed.contains(&Action::Jump),
            high_jump: self.pressed.contains(&Action::HighJump),
            pause: self.pressed.contains(&Action::Pause),
            restart: self.pressed.contains(&Action::Restart),
            now_ms,
        }
    }

    /// Clear one-shot inputs after they have been processed
    pub fn clear_edges(&mut self) {
        self.pressed.clear();
    }
}
