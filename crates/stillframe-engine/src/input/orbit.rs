use super::state::InputState;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseWheelDelta};

/// Camera or window action requested by user input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewAction {
    /// Angles in radians.
    Orbit { yaw: f32, pitch: f32 },
    /// Wheel steps; positive moves closer.
    Zoom(f32),
    Reset,
    Close,
}

/// Maps input events to view actions: left-drag orbits, the wheel zooms,
/// `R` resets, `Escape`/`Q` close.
#[derive(Debug, Copy, Clone)]
pub struct OrbitControls {
    pub radians_per_pixel: f32,
    /// Pixel-precise wheels report pixels; this many make one step.
    pub pixels_per_step: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            radians_per_pixel: 0.01,
            pixels_per_step: 40.0,
        }
    }
}

impl OrbitControls {
    /// Interprets `ev` against the state *before* the event is applied, so
    /// drag deltas are measured from the previous pointer position.
    pub fn interpret(&self, state: &InputState, ev: &InputEvent) -> Option<ViewAction> {
        match *ev {
            InputEvent::PointerMoved { x, y } => {
                let (px, py) = state.pointer_pos?;
                if !state.button_down(MouseButton::Left) {
                    return None;
                }
                let (dx, dy) = (x - px, y - py);
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                Some(ViewAction::Orbit {
                    yaw: -dx * self.radians_per_pixel,
                    pitch: dy * self.radians_per_pixel,
                })
            }

            InputEvent::MouseWheel(delta) => {
                let steps = match delta {
                    MouseWheelDelta::Line { y, .. } => y,
                    MouseWheelDelta::Pixel { y, .. } => y / self.pixels_per_step.max(1.0),
                };
                (steps != 0.0).then_some(ViewAction::Zoom(steps))
            }

            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat: false,
            } => match key {
                Key::Escape | Key::Q => Some(ViewAction::Close),
                Key::R => Some(ViewAction::Reset),
                Key::Other => None,
            },

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButtonState;

    fn key(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        }
    }

    /// Feeds events the way the runtime does and collects the actions.
    fn run(events: &[InputEvent]) -> Vec<ViewAction> {
        let controls = OrbitControls::default();
        let mut state = InputState::default();
        let mut out = Vec::new();
        for ev in events {
            out.extend(controls.interpret(&state, ev));
            state.apply_event(ev);
        }
        out
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn left_drag_orbits() {
        let actions = run(&[
            InputEvent::PointerMoved { x: 10.0, y: 10.0 },
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
            },
            InputEvent::PointerMoved { x: 20.0, y: 5.0 },
        ]);
        assert_eq!(actions.len(), 1);
        let ViewAction::Orbit { yaw, pitch } = actions[0] else {
            panic!("expected orbit, got {:?}", actions[0]);
        };
        assert!((yaw + 0.1).abs() < 1e-6);
        assert!((pitch + 0.05).abs() < 1e-6);
    }

    #[test]
    fn hover_and_right_drag_do_nothing() {
        let actions = run(&[
            InputEvent::PointerMoved { x: 0.0, y: 0.0 },
            InputEvent::PointerMoved { x: 5.0, y: 5.0 },
            InputEvent::PointerButton {
                button: MouseButton::Right,
                state: MouseButtonState::Pressed,
            },
            InputEvent::PointerMoved { x: 9.0, y: 9.0 },
        ]);
        assert!(actions.is_empty());
    }

    #[test]
    fn drag_stops_after_release() {
        let actions = run(&[
            InputEvent::PointerMoved { x: 0.0, y: 0.0 },
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
            },
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: MouseButtonState::Released,
            },
            InputEvent::PointerMoved { x: 50.0, y: 0.0 },
        ]);
        assert!(actions.is_empty());
    }

    // ── wheel & keys ──────────────────────────────────────────────────────

    #[test]
    fn wheel_zooms_in_steps() {
        let actions = run(&[
            InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 2.0 }),
            InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 0.0, y: -80.0 }),
            InputEvent::MouseWheel(MouseWheelDelta::Line { x: 1.0, y: 0.0 }),
        ]);
        assert_eq!(actions, [ViewAction::Zoom(2.0), ViewAction::Zoom(-2.0)]);
    }

    #[test]
    fn keys_reset_and_close() {
        let actions = run(&[key(Key::R), key(Key::Escape), key(Key::Q), key(Key::Other)]);
        assert_eq!(actions, [ViewAction::Reset, ViewAction::Close, ViewAction::Close]);
    }

    #[test]
    fn key_repeat_and_release_are_ignored() {
        let actions = run(&[
            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
                repeat: true,
            },
            InputEvent::Key {
                key: Key::R,
                state: KeyState::Released,
                repeat: false,
            },
        ]);
        assert!(actions.is_empty());
    }
}
