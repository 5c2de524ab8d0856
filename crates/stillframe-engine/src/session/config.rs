use std::path::PathBuf;

use crate::device::ContextInit;

/// Which execution mode a session runs in.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Mode {
    /// Every mesh in `mesh_dir`, one numbered capture each.
    #[default]
    Batch,
    /// `mesh_path` only, previewed in a window, captured once after it closes.
    Interactive,
}

/// Inputs and outputs of one session.
///
/// Relative paths resolve against the working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub options_path: PathBuf,

    /// Batch input directory.
    pub mesh_dir: PathBuf,
    /// Batch output directory; created if missing.
    pub output_dir: PathBuf,

    /// Interactive input mesh.
    pub mesh_path: PathBuf,
    /// Interactive capture file.
    pub capture_path: PathBuf,

    /// Captured image size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Batch,
            options_path: PathBuf::from("scripts/renderOptions.json"),
            mesh_dir: PathBuf::from("meshes"),
            output_dir: PathBuf::from("renders"),
            mesh_path: PathBuf::from("carved.ply"),
            capture_path: PathBuf::from("capture.png"),
            width: 1920,
            height: 1080,
        }
    }
}

impl SessionConfig {
    /// GPU context parameters for this session; the capture size comes from
    /// `width` and `height`.
    pub fn context_init(&self) -> ContextInit {
        ContextInit {
            width: self.width,
            height: self.height,
            ..ContextInit::default()
        }
    }
}
