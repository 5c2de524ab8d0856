//! Stillframe engine crate.
//!
//! Renders triangle meshes into PNG frames: either every mesh in a directory
//! (batch) or one mesh after an interactive preview. GPU, window and input
//! plumbing live here; the binary only parses arguments.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod error;
pub mod options;
pub mod geometry;
pub mod render;
pub mod session;

mod context;

pub use context::RenderContext;
pub use error::{CaptureWriteError, ConfigLoadError, MeshLoadError, SessionError};
pub use options::RenderOptions;
pub use session::{run_session, Mode, SessionConfig, SessionReport};
