//! Error taxonomy of the rendering pipeline.
//!
//! GPU and window plumbing reports `anyhow::Error`; these types mark the
//! failures the mode controller has to tell apart.

use std::path::PathBuf;

/// The render-options file could not be used. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("cannot read render options {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed render options {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A mesh file could not be turned into displayable geometry.
///
/// Recoverable in batch mode (the ordinal is skipped), fatal in interactive mode.
#[derive(Debug, thiserror::Error)]
pub enum MeshLoadError {
    #[error("cannot read mesh {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ply mesh {}: {source}", path.display())]
    Ply {
        path: PathBuf,
        #[source]
        source: stillframe_ply::ParseError,
    },

    #[error("invalid obj mesh {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("unsupported mesh format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("mesh has no vertices: {}", path.display())]
    Empty { path: PathBuf },
}

/// A frame could not be produced or written. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum CaptureWriteError {
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rendering failed before capturing {}: {reason:#}", path.display())]
    Render { path: PathBuf, reason: anyhow::Error },

    #[error("frame readback failed for {}: {reason:#}", path.display())]
    Readback { path: PathBuf, reason: anyhow::Error },

    #[error("cannot write image {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors that abort a whole session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to create render context: {0:#}")]
    ContextCreation(anyhow::Error),

    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error("cannot list mesh directory {}: {source}", path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Mesh(#[from] MeshLoadError),

    #[error(transparent)]
    Capture(#[from] CaptureWriteError),

    #[error("interactive session failed: {0:#}")]
    Interactive(anyhow::Error),
}
