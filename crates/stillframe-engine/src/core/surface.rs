use std::path::Path;

use anyhow::Result;
use stillframe_ply::TriangleMesh;

use crate::error::CaptureWriteError;
use crate::options::RenderOptions;

/// A drawing surface with render options, one geometry slot and a capture
/// facility.
///
/// Methods are raw steps with no ordering checks of their own; use
/// [`Viewer`](crate::core::Viewer) to drive them.
pub trait RenderSurface {
    /// Replaces the render options used by subsequent renders.
    fn apply_options(&mut self, options: &RenderOptions);

    /// Places `mesh` in the geometry slot and frames the view around it.
    fn add_geometry(&mut self, mesh: TriangleMesh);

    /// Synchronizes the staged geometry with its GPU copy.
    fn update_geometry(&mut self) -> Result<()>;

    /// Drains pending device work without blocking.
    fn poll_events(&mut self) -> Result<()>;

    /// Renders one frame of the current geometry.
    fn update_renderer(&mut self) -> Result<()>;

    /// Writes the last rendered frame to `path`.
    fn capture_screen_image(&mut self, path: &Path) -> Result<(), CaptureWriteError>;

    /// Empties the geometry slot and hands the mesh back.
    fn remove_geometry(&mut self) -> Option<TriangleMesh>;

    /// Runs the user-driven event loop until it is closed.
    fn run(&mut self) -> Result<()>;

    /// Number of geometries currently in the slot (0 or 1).
    fn staged_count(&self) -> usize;
}
