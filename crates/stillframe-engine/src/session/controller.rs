use crate::core::{Configured, RenderSurface, Viewer};
use crate::error::{CaptureWriteError, SessionError};
use crate::geometry::{enumerate_meshes, load_mesh};
use crate::options::load_render_options;

use super::{CapturedFrame, Mode, SessionConfig, SessionReport, SkippedMesh};

/// Runs one session to completion.
///
/// `create_surface` builds the render surface; it is called first, and the
/// surface is dropped when the session ends. Options are loaded and applied
/// before any mesh is read, and a bad options file aborts the session before
/// the output directory is created.
pub fn run_session<S, F>(config: &SessionConfig, create_surface: F) -> Result<SessionReport, SessionError>
where
    S: RenderSurface,
    F: FnOnce() -> anyhow::Result<S>,
{
    let surface = create_surface().map_err(SessionError::ContextCreation)?;

    let options = load_render_options(&config.options_path)?;
    let viewer = Viewer::new(surface).configure(&options);

    let report = match config.mode {
        Mode::Batch => run_batch(config, viewer)?,
        Mode::Interactive => run_interactive(config, viewer)?,
    };

    report.log_summary();
    Ok(report)
}

fn run_batch<S: RenderSurface>(
    config: &SessionConfig,
    mut viewer: Viewer<S, Configured>,
) -> Result<SessionReport, SessionError> {
    std::fs::create_dir_all(&config.output_dir).map_err(|source| CaptureWriteError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let assets = enumerate_meshes(&config.mesh_dir).map_err(|source| SessionError::Enumerate {
        path: config.mesh_dir.clone(),
        source,
    })?;
    log::info!("{} mesh(es) in {}", assets.len(), config.mesh_dir.display());

    let mut report = SessionReport::default();
    for asset in assets {
        log::info!("read mesh {} ({})", asset.ordinal, asset.file_name());

        let mesh = match load_mesh(&asset.path) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::warn!("skipping mesh {} ({}): {err}", asset.ordinal, asset.file_name());
                report.skipped.push(SkippedMesh {
                    ordinal: asset.ordinal,
                    source: asset.path,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let path = config.output_dir.join(asset.frame_name());
        let mut staged = viewer.stage(mesh);
        staged.render_and_capture(&path)?;
        staged.retire();

        log::debug!("wrote {}", path.display());
        report.frames.push(CapturedFrame {
            ordinal: asset.ordinal,
            source: asset.path,
            path,
        });
    }

    Ok(report)
}

fn run_interactive<S: RenderSurface>(
    config: &SessionConfig,
    mut viewer: Viewer<S, Configured>,
) -> Result<SessionReport, SessionError> {
    let mesh = load_mesh(&config.mesh_path)?;
    log::info!("previewing {}; close the window to capture", config.mesh_path.display());

    let mut staged = viewer.stage(mesh);
    staged.run_interactive().map_err(SessionError::Interactive)?;
    staged.render_and_capture(&config.capture_path)?;
    staged.retire();

    Ok(SessionReport {
        frames: vec![CapturedFrame {
            ordinal: 0,
            source: config.mesh_path.clone(),
            path: config.capture_path.clone(),
        }],
        skipped: Vec::new(),
    })
}
