use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use stillframe_engine::logging::{init_logging, LoggingConfig};
use stillframe_engine::{run_session, Mode, RenderContext, SessionConfig};

/// Render meshes to PNG frames with a fixed set of render options.
///
/// Without `--interactive`, every file in the mesh directory is rendered to
/// `renderNNN.png` in the output directory, in file-name order. With it, one
/// mesh is shown in a preview window and captured when the window closes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Preview a single mesh, then capture it.
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Render-options JSON file.
    #[arg(long, default_value = "scripts/renderOptions.json")]
    options: PathBuf,

    /// Directory of meshes for batch mode.
    #[arg(long, default_value = "meshes")]
    meshes: PathBuf,

    /// Directory for batch frames; created if missing.
    #[arg(long, default_value = "renders")]
    output_dir: PathBuf,

    /// Mesh shown in interactive mode.
    #[arg(long, default_value = "carved.ply")]
    mesh: PathBuf,

    /// Image written when the interactive preview closes.
    #[arg(long, default_value = "capture.png")]
    capture: PathBuf,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 1920, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 1080, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Log filter, e.g. "debug" or "stillframe_engine=debug,wgpu=warn".
    /// Falls back to RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: if self.interactive { Mode::Interactive } else { Mode::Batch },
            options_path: self.options.clone(),
            mesh_dir: self.meshes.clone(),
            output_dir: self.output_dir.clone(),
            mesh_path: self.mesh.clone(),
            capture_path: self.capture.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.session_config();
    let init = config.context_init();

    run_session(&config, || RenderContext::new(init))?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
