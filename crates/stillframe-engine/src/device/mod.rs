//! GPU device and render-target management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - owning the off-screen color/depth target and reading frames back
//! - configuring window surfaces for the interactive preview

mod error;
mod gpu;
mod init;
pub(crate) mod surface;
mod target;

pub use error::SurfaceErrorAction;
pub use gpu::Gpu;
pub use init::ContextInit;
pub use target::{DepthTarget, OffscreenTarget, DEPTH_FORMAT, OFFSCREEN_FORMAT};
