//! GPU rendering subsystem.
//!
//! The mesh renderer owns its GPU resources (pipelines, uniform buffer) and
//! draws one staged mesh per frame into whatever target it is handed, so the
//! same code serves the off-screen capture path and the preview window.
//!
//! Convention:
//! - World space is right-handed with +Y up, as stored in the mesh files.
//! - Colors reaching the shaders are linear; targets are sRGB.

mod camera;
mod ctx;
mod mesh;
mod renderer;

pub use camera::Camera;
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::GpuMesh;
pub use renderer::MeshRenderer;
