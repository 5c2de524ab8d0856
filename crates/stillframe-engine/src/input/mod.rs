//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The window runtime translates platform events into `InputEvent`s and
//! feeds them through `OrbitControls` to steer the preview camera.

mod orbit;
mod state;
mod types;

pub use orbit::{OrbitControls, ViewAction};
pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
};
