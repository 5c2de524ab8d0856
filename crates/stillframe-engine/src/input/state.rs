use std::collections::HashSet;

use super::types::{InputEvent, MouseButton, MouseButtonState};

/// Current input state for the preview window.
///
/// Holds "is down" information and the current pointer position.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(false) => {
                // Avoids stuck buttons when focus changes mid-drag.
                self.buttons_down.clear();
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::PointerButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    self.buttons_down.insert(*button);
                }
                MouseButtonState::Released => {
                    self.buttons_down.remove(button);
                }
            },

            InputEvent::Key { .. } | InputEvent::MouseWheel(_) | InputEvent::Focused(true) => {}
        }
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton {
            button,
            state: MouseButtonState::Pressed,
        }
    }

    #[test]
    fn tracks_pointer_and_buttons() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerMoved { x: 3.0, y: 4.0 });
        s.apply_event(&press(MouseButton::Left));
        assert_eq!(s.pointer_pos, Some((3.0, 4.0)));
        assert!(s.button_down(MouseButton::Left));

        s.apply_event(&InputEvent::PointerButton {
            button: MouseButton::Left,
            state: MouseButtonState::Released,
        });
        assert!(!s.button_down(MouseButton::Left));

        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
    }

    #[test]
    fn focus_loss_releases_buttons() {
        let mut s = InputState::default();
        s.apply_event(&press(MouseButton::Left));
        s.apply_event(&press(MouseButton::Right));
        s.apply_event(&InputEvent::Focused(false));
        assert!(s.buttons_down.is_empty());
    }
}
