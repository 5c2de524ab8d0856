use std::path::Path;

use anyhow::{Context, Result};
use stillframe_ply::TriangleMesh;
use winit::dpi::LogicalSize;

use crate::core::RenderSurface;
use crate::device::{ContextInit, Gpu, OffscreenTarget, OFFSCREEN_FORMAT};
use crate::error::CaptureWriteError;
use crate::options::RenderOptions;
use crate::render::{Camera, GpuMesh, MeshRenderer, RenderCtx, RenderTarget};
use crate::window::{run_preview, PreviewScene, WindowConfig};

/// Largest side of the preview window, in logical pixels.
const PREVIEW_MAX_SIDE: f64 = 1280.0;

/// The wgpu-backed render surface.
///
/// Frames are rendered into a fixed-size off-screen target, so batch runs
/// need no window. [`RenderSurface::run`] opens a preview window on the same
/// device; its final camera carries over to the next capture.
pub struct RenderContext {
    init: ContextInit,
    gpu: Gpu,
    target: OffscreenTarget,
    renderer: MeshRenderer,
    options: RenderOptions,
    camera: Camera,
    staged: Option<StagedGeometry>,
}

/// CPU mesh plus its GPU copy, uploaded lazily by `update_geometry`.
struct StagedGeometry {
    mesh: TriangleMesh,
    gpu: Option<GpuMesh>,
    dirty: bool,
}

impl RenderContext {
    /// Acquires a GPU device and allocates the off-screen target.
    pub fn new(init: ContextInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(&init))?;
        let target = OffscreenTarget::new(gpu.device(), init.width, init.height)?;
        log::info!("render context ready ({}x{})", init.width, init.height);

        Ok(Self {
            init,
            gpu,
            target,
            renderer: MeshRenderer::new(),
            options: RenderOptions::default(),
            camera: Camera::default(),
            staged: None,
        })
    }

    fn window_config(&self) -> WindowConfig {
        let (w, h) = (f64::from(self.init.width), f64::from(self.init.height));
        let scale = (PREVIEW_MAX_SIDE / w.max(h)).min(1.0);
        WindowConfig {
            title: self.init.title.clone(),
            initial_size: LogicalSize::new(w * scale, h * scale),
        }
    }
}

impl RenderSurface for RenderContext {
    fn apply_options(&mut self, options: &RenderOptions) {
        self.options = options.clone();
    }

    fn add_geometry(&mut self, mesh: TriangleMesh) {
        if self.staged.is_some() {
            log::warn!("replacing geometry that was never removed");
        }
        if let Some(bounds) = mesh.bounds() {
            self.camera = Camera::fit(&bounds);
        }
        self.staged = Some(StagedGeometry {
            mesh,
            gpu: None,
            dirty: true,
        });
    }

    fn update_geometry(&mut self) -> Result<()> {
        let Some(staged) = self.staged.as_mut() else { return Ok(()) };
        if staged.dirty {
            staged.gpu = GpuMesh::upload(self.gpu.device(), &staged.mesh)?;
            staged.dirty = false;
            self.gpu.take_error().context("mesh upload failed")?;
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Result<()> {
        self.gpu.poll()?;
        self.gpu.take_error()
    }

    fn update_renderer(&mut self) -> Result<()> {
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stillframe offscreen encoder"),
            });

        {
            let ctx = RenderCtx::new(
                self.gpu.device(),
                self.gpu.queue(),
                OFFSCREEN_FORMAT,
                self.target.size(),
            );
            let mut target = RenderTarget::new(
                &mut encoder,
                self.target.color_view(),
                self.target.depth_view(),
            );
            let mesh = self.staged.as_ref().and_then(|s| s.gpu.as_ref());
            self.renderer
                .render(&ctx, &mut target, mesh, &self.camera, &self.options);
        }

        self.gpu.submit(encoder);
        self.gpu.take_error()
    }

    fn capture_screen_image(&mut self, path: &Path) -> Result<(), CaptureWriteError> {
        let image = self
            .target
            .read_rgb(&self.gpu)
            .map_err(|reason| CaptureWriteError::Readback {
                path: path.to_path_buf(),
                reason,
            })?;

        image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| CaptureWriteError::Encode {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("captured {}", path.display());
        Ok(())
    }

    fn remove_geometry(&mut self) -> Option<TriangleMesh> {
        // Dropping the GPU copy releases its buffers.
        self.staged.take().map(|s| s.mesh)
    }

    fn run(&mut self) -> Result<()> {
        let config = self.window_config();
        let scene = PreviewScene {
            gpu: &self.gpu,
            mesh: self.staged.as_ref().and_then(|s| s.gpu.as_ref()),
            options: &self.options,
            camera: &mut self.camera,
        };
        run_preview(config, scene)
    }

    fn staged_count(&self) -> usize {
        usize::from(self.staged.is_some())
    }
}
