use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

// Import from the library crate
use spincube::{
    logging,
    controller::{FrameLoopContext, InputEvent},
    ui::DebugOverlay,
    view::{gpu_init, GpuContext, RenderState, SurfaceErrorAction, CUBE_SHADER},
    CubeConfig, CubeError,
};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render_state: RenderState,
    frame_ctx: FrameLoopContext,
    overlay: Option<DebugOverlay>,

    // winit reports button presses without a position
    cursor_pos: (f32, f32),
    start_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>, config: CubeConfig) -> Result<Self, CubeError> {
        let size = window.inner_size();

        let instance = gpu_init::create_instance();
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::from_surface(&instance, surface, size.width, size.height).await?;

        let render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
            CUBE_SHADER,
            config.debug_overlay,
        )
        .await?;

        let overlay = config.debug_overlay.then(DebugOverlay::new);
        let frame_ctx = FrameLoopContext::new(config, gpu.config.width, gpu.config.height);

        Ok(Self {
            window,
            gpu,
            render_state,
            frame_ctx,
            overlay,
            cursor_pos: (0.0, 0.0),
            start_time: Instant::now(),
        })
    }

    fn viewport(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Translate a window event into a pointer event, if it is one
    fn pointer_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                let (x, y) = self.cursor_pos;
                Some(InputEvent::PointerDown { x, y })
            }
            WindowEvent::MouseInput { state: ElementState::Released, button: MouseButton::Left, .. } => Some(InputEvent::PointerUp),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = (position.x as f32, position.y as f32);
                Some(InputEvent::PointerMove { x: position.x as f32, y: position.y as f32 })
            }
            WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeave),
            _ => None,
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match self.pointer_event(event) {
            Some(pointer) => {
                let viewport = self.viewport();
                self.frame_ctx.handle_input(&pointer, viewport);
                true
            }
            None => false,
        }
    }

    /// Draw one frame. Returns false when rendering can not continue.
    fn redraw(&mut self) -> bool {
        let time = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frame = self.frame_ctx.update(time, self.viewport());

        let overlay_frame = self.overlay.as_ref().map(|o| {
            o.build(&self.frame_ctx.state.drag, &frame, self.window.scale_factor() as f32)
        });

        match self.render_state.draw_frame(
            self.gpu.device.as_ref(),
            self.gpu.queue.as_ref(),
            &self.gpu.surface,
            &frame,
            overlay_frame,
        ) {
            Ok(()) => true,
            Err(err) => {
                self.render_state.handle_surface_error(self.gpu.device.as_ref(), &self.gpu.surface, err)
                    != SurfaceErrorAction::Fatal
            }
        }
    }
}

/// Keep the typed error (and its sources) under the context message
fn setup_error(err: CubeError) -> anyhow::Error {
    anyhow::Error::new(err).context("GPU setup failed")
}

struct Runner {
    config: CubeConfig,
    app: Option<App>,
    error: Option<anyhow::Error>,
}

impl Runner {
    fn new(config: CubeConfig) -> Self {
        Self { config, app: None, error: None }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("spincube")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.initial_width,
                self.config.initial_height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, anyhow!(err).context("failed to create window"));
                return;
            }
        };

        match pollster::block_on(App::new(window, self.config.clone())) {
            Ok(app) => {
                tracing::info!("spincube running");
                self.app = Some(app);
            }
            Err(err) => self.fail(event_loop, setup_error(err)),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else { return };
        if window_id != app.window.id() || app.input(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if !app.redraw() {
                    self.fail(event_loop, anyhow!("surface out of memory"));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut runner = Runner::new(CubeConfig::default());
    event_loop
        .run_app(&mut runner)
        .context("winit event loop terminated with error")?;

    match runner.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_keeps_typed_cause() {
        let err = setup_error(CubeError::Shader("expected `;`".into()));
        assert_eq!(err.to_string(), "GPU setup failed");
        assert!(matches!(err.downcast_ref::<CubeError>(), Some(CubeError::Shader(_))));
        assert_eq!(err.root_cause().to_string(), "shader compilation failed: expected `;`");
    }
}
