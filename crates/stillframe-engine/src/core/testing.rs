//! Recording `RenderSurface` for tests that must run without a GPU.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use stillframe_ply::TriangleMesh;

use crate::error::CaptureWriteError;
use crate::options::RenderOptions;

use super::RenderSurface;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ApplyOptions,
    /// Vertex count of the added mesh.
    AddGeometry(usize),
    UpdateGeometry,
    PollEvents,
    UpdateRenderer,
    Capture(PathBuf),
    RemoveGeometry,
    Run,
}

#[derive(Debug, Default)]
pub(crate) struct Recording {
    pub calls: Vec<Call>,
    pub options: Option<RenderOptions>,
    pub slot: Option<TriangleMesh>,
    /// Highest number of simultaneously staged geometries observed.
    pub max_staged: usize,
    /// Mesh in the slot at each capture.
    pub captured_meshes: Vec<TriangleMesh>,
    pub fail_render: bool,
    pub fail_upload: bool,
}

impl Recording {
    pub fn captures(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Capture(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Surface whose log stays readable after the surface itself was consumed.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSurface {
    pub log: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for RecordingSurface {
    fn apply_options(&mut self, options: &RenderOptions) {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::ApplyOptions);
        log.options = Some(options.clone());
    }

    fn add_geometry(&mut self, mesh: TriangleMesh) {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::AddGeometry(mesh.vertices.len()));
        let staged = usize::from(log.slot.is_some()) + 1;
        log.max_staged = log.max_staged.max(staged);
        log.slot = Some(mesh);
    }

    fn update_geometry(&mut self) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::UpdateGeometry);
        anyhow::ensure!(!log.fail_upload, "mesh vertex buffer exceeds the device limit");
        Ok(())
    }

    fn poll_events(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().calls.push(Call::PollEvents);
        Ok(())
    }

    fn update_renderer(&mut self) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::UpdateRenderer);
        anyhow::ensure!(!log.fail_render, "device lost");
        Ok(())
    }

    fn capture_screen_image(&mut self, path: &Path) -> Result<(), CaptureWriteError> {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::Capture(path.to_path_buf()));
        if let Some(mesh) = log.slot.clone() {
            log.captured_meshes.push(mesh);
        }
        std::fs::write(path, b"frame").map_err(|e| CaptureWriteError::Encode {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })
    }

    fn remove_geometry(&mut self) -> Option<TriangleMesh> {
        let mut log = self.log.borrow_mut();
        log.calls.push(Call::RemoveGeometry);
        log.slot.take()
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().calls.push(Call::Run);
        Ok(())
    }

    fn staged_count(&self) -> usize {
        usize::from(self.log.borrow().slot.is_some())
    }
}
