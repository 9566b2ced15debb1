//! Polled input state.
//!
//! The editor never reacts to window events directly; whatever owns the event
//! loop feeds button and cursor changes in here, and editor logic polls the
//! accumulated state once per frame.

use std::collections::HashSet;

use glam::Vec2;

/// Mouse button type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input state snapshot, updated by the host event loop and polled by editor
/// logic.
#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<MouseButton>,
    just_pressed: HashSet<MouseButton>,
    just_released: HashSet<MouseButton>,
    cursor_position: Vec2,
    cursor_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.cursor_delta = Vec2::ZERO;
    }

    /// Record a button press or release.
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if !self.pressed.contains(&button) {
                self.just_pressed.insert(button);
            }
            self.pressed.insert(button);
        } else {
            self.pressed.remove(&button);
            self.just_released.insert(button);
        }
    }

    /// Record cursor movement.
    pub fn set_cursor(&mut self, position: Vec2) {
        self.cursor_delta += position - self.cursor_position;
        self.cursor_position = position;
    }

    /// Check if a button is currently held.
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    /// Check if a button went down this frame.
    pub fn is_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed.contains(&button)
    }

    /// Check if a button went up this frame.
    pub fn is_button_just_released(&self, button: MouseButton) -> bool {
        self.just_released.contains(&button)
    }

    /// Current cursor position in window pixels.
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }

    /// Cursor movement accumulated this frame.
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_lasts_one_frame() {
        let mut input = InputState::new();

        input.set_button(MouseButton::Left, true);
        assert!(input.is_button_down(MouseButton::Left));
        assert!(input.is_button_just_pressed(MouseButton::Left));

        input.begin_frame();
        assert!(input.is_button_down(MouseButton::Left));
        assert!(!input.is_button_just_pressed(MouseButton::Left));
    }

    #[test]
    fn test_held_button_does_not_repeat_just_pressed() {
        let mut input = InputState::new();

        input.set_button(MouseButton::Left, true);
        input.begin_frame();
        // OS key repeat can resend the press while held.
        input.set_button(MouseButton::Left, true);
        assert!(!input.is_button_just_pressed(MouseButton::Left));
    }

    #[test]
    fn test_release() {
        let mut input = InputState::new();

        input.set_button(MouseButton::Right, true);
        input.begin_frame();
        input.set_button(MouseButton::Right, false);

        assert!(!input.is_button_down(MouseButton::Right));
        assert!(input.is_button_just_released(MouseButton::Right));
    }

    #[test]
    fn test_cursor_delta_accumulates_and_resets() {
        let mut input = InputState::new();

        input.set_cursor(Vec2::new(10.0, 10.0));
        input.begin_frame();

        input.set_cursor(Vec2::new(15.0, 10.0));
        input.set_cursor(Vec2::new(15.0, 4.0));
        assert_eq!(input.cursor_delta(), Vec2::new(5.0, -6.0));
        assert_eq!(input.cursor_position(), Vec2::new(15.0, 4.0));

        input.begin_frame();
        assert_eq!(input.cursor_delta(), Vec2::ZERO);
    }
}
