//! Interactive preview window.
//!
//! Owns the `winit` EventLoop and Window for the duration of one preview and
//! renders the staged mesh into the window surface until the user closes it.

mod runtime;

pub use runtime::{run_preview, PreviewScene, WindowConfig};
