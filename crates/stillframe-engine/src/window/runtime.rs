use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::device::{surface, DepthTarget, Gpu, SurfaceErrorAction};
use crate::input::{
    InputEvent, InputState, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta,
    OrbitControls, ViewAction,
};
use crate::options::RenderOptions;
use crate::render::{Camera, GpuMesh, MeshRenderer, RenderCtx, RenderTarget};

/// Preview window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "stillframe".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Everything the preview draws, borrowed from the render context for the
/// duration of the loop. Camera changes persist after the loop returns.
pub struct PreviewScene<'a> {
    pub gpu: &'a Gpu,
    pub mesh: Option<&'a GpuMesh>,
    pub options: &'a RenderOptions,
    pub camera: &'a mut Camera,
}

/// Opens the preview window and blocks until the user closes it.
pub fn run_preview(config: WindowConfig, scene: PreviewScene<'_>) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = PreviewApp {
        config,
        scene,
        window: None,
        renderer: MeshRenderer::new(),
        input: InputState::default(),
        controls: OrbitControls::default(),
        error: None,
    };

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    surface: wgpu::Surface<'this>,
}

struct PreviewWindow {
    entry: WindowEntry,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
}

struct PreviewApp<'a> {
    config: WindowConfig,
    scene: PreviewScene<'a>,
    window: Option<PreviewWindow>,
    renderer: MeshRenderer,
    input: InputState,
    controls: OrbitControls,

    /// First fatal error; reported once the loop has exited.
    error: Option<anyhow::Error>,
}

impl PreviewApp<'_> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("preview failed: {err:#}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<PreviewWindow> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu = self.scene.gpu;
        let entry = WindowEntryTryBuilder {
            window,
            surface_builder: |w| gpu.instance().create_surface(w),
        }
        .try_build()
        .context("failed to create wgpu surface")?;

        let size = entry.borrow_window().inner_size();
        let config = entry.with_surface(|s| surface::configure(gpu, s, size))?;
        let depth = DepthTarget::new(gpu.device(), config.width, config.height);

        log::debug!("preview surface {}x{} {:?}", config.width, config.height, config.format);
        Ok(PreviewWindow { entry, config, depth })
    }

    fn resize(&mut self) {
        let Some(win) = self.window.as_mut() else { return };
        let device = self.scene.gpu.device();
        let new_size = win.entry.borrow_window().inner_size();

        let configured = win
            .entry
            .with_surface(|s| surface::apply_resize(s, device, &mut win.config, new_size));
        if configured {
            win.depth.ensure_size(device, win.config.width, win.config.height);
        }
        win.entry.borrow_window().request_redraw();
    }

    /// Draws and presents one frame.
    fn redraw(&mut self) -> Result<()> {
        let Some(win) = self.window.as_mut() else { return Ok(()) };
        let gpu = self.scene.gpu;

        let frame = match win.entry.borrow_surface().get_current_texture() {
            Ok(f) => f,
            Err(err) => {
                let action = win.entry.with_surface(|s| {
                    surface::map_surface_error(s, gpu.device(), &win.config, err)
                });
                anyhow::ensure!(
                    action != SurfaceErrorAction::Fatal,
                    "window surface is out of memory"
                );
                return Ok(());
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stillframe preview encoder"),
            });

        // RenderTarget borrows the encoder; dropped before submit() takes it.
        {
            let ctx = RenderCtx::new(
                gpu.device(),
                gpu.queue(),
                win.config.format,
                (win.config.width, win.config.height),
            );
            let mut target = RenderTarget::new(&mut encoder, &view, win.depth.view());
            self.renderer.render(
                &ctx,
                &mut target,
                self.scene.mesh,
                self.scene.camera,
                self.scene.options,
            );
        }

        win.entry.borrow_window().pre_present_notify();
        gpu.submit(encoder);
        frame.present();
        gpu.take_error()
    }

    fn apply_action(&mut self, event_loop: &ActiveEventLoop, action: ViewAction) {
        let camera = &mut *self.scene.camera;
        match action {
            ViewAction::Orbit { yaw, pitch } => camera.orbit(yaw, pitch),
            ViewAction::Zoom(steps) => camera.zoom(steps),
            ViewAction::Reset => camera.reset(),
            ViewAction::Close => {
                event_loop.exit();
                return;
            }
        }
        if let Some(win) = self.window.as_ref() {
            win.entry.borrow_window().request_redraw();
        }
    }
}

impl ApplicationHandler for PreviewApp<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window(event_loop) {
            Ok(win) => {
                win.entry.borrow_window().request_redraw();
                self.window = Some(win);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw while the preview is open.
        if let Some(win) = self.window.as_ref() {
            win.entry.borrow_window().request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize();
                return;
            }

            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
                return;
            }

            _ => {}
        }

        let Some(win) = self.window.as_ref() else { return };
        let Some(ev) = translate_input_event(win.entry.borrow_window(), &event) else {
            return;
        };

        let action = self.controls.interpret(&self.input, &ev);
        self.input.apply_event(&ev);
        if let Some(action) = action {
            self.apply_action(event_loop, action);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surface before window, handled by the self-referencing entry.
        self.window = None;
    }
}

fn translate_input_event(window: &Window, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical_f32(window, *position);
            Some(InputEvent::PointerMoved { x, y })
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let state = match state {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            Some(InputEvent::PointerButton {
                button: map_mouse_button(*button),
                state,
            })
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = to_logical_f32(window, *p);
                    MouseWheelDelta::Pixel { x, y }
                }
            };
            Some(InputEvent::MouseWheel(delta))
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };
            Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state,
                repeat: event.repeat,
            })
        }

        _ => None,
    }
}

fn to_logical_f32(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x as f32, logical.y as f32)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(KeyCode::KeyQ) => Key::Q,
        PhysicalKey::Code(KeyCode::KeyR) => Key::R,
        _ => Key::Other,
    }
}
