// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::CubeConfig;
pub use error::CubeError;

#[cfg(target_arch = "wasm32")]
use {
    std::cell::RefCell,
    std::rc::Rc,
    wasm_bindgen::closure::Closure,
    wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue},
    web_sys::{Document, HtmlCanvasElement, MouseEvent, Window},
    controller::{input, FrameLoopContext, InputEvent},
    ui::DebugOverlay,
    view::{GpuContext, RenderState, SurfaceErrorAction, CUBE_SHADER},
};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();

    let window = match web_sys::window() {
        Some(window) => window,
        None => {
            tracing::error!("{}", CubeError::NoWindow);
            return Err(CubeError::NoWindow.into());
        }
    };

    if let Err(err) = setup_app(&window, CubeConfig::default()).await {
        report_fatal(&window, &err);
        return Err(err.into());
    }
    Ok(())
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(window: &Window, config: CubeConfig) -> Result<(), CubeError> {
    let document = window
        .document()
        .ok_or_else(|| CubeError::Dom("no document on window".into()))?;
    let canvas = acquire_canvas(&document, &config)?;
    let (width, height) = (canvas.width(), canvas.height());
    tracing::info!(width, height, canvas = %config.canvas_id, "canvas ready");

    let gpu = GpuContext::new(&canvas, width, height).await?;
    let mut render_state = RenderState::new(
        gpu.device.as_ref(),
        gpu.format,
        gpu.config.alpha_mode,
        width,
        height,
        CUBE_SHADER,
        config.debug_overlay,
    )
    .await?;

    let overlay = config.debug_overlay.then(DebugOverlay::new);
    let frame_ctx = Rc::new(RefCell::new(FrameLoopContext::new(config, width, height)));

    setup_input_listeners(&canvas, frame_ctx.clone())
        .map_err(|e| CubeError::Dom(format!("failed to attach pointer listeners: {e:?}")))?;

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window = window.clone();

        move |time| {
            // The canvas size is read live; only the viewport follows it
            let viewport = (canvas.width(), canvas.height());
            let frame = frame_ctx.borrow_mut().update(time, viewport);

            let overlay_frame = overlay.as_ref().map(|o| {
                let dpr = window.device_pixel_ratio() as f32;
                o.build(&frame_ctx.borrow().state.drag, &frame, dpr)
            });

            match render_state.draw_frame(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &gpu.surface,
                &frame,
                overlay_frame,
            ) {
                Ok(()) => true,
                Err(err) => {
                    render_state.handle_surface_error(gpu.device.as_ref(), &gpu.surface, err)
                        != SurfaceErrorAction::Fatal
                }
            }
        }
    });
    f.start();

    Ok(())
}

/// Use the page's `#glcanvas` if there is one, otherwise append a fresh canvas
#[cfg(target_arch = "wasm32")]
fn acquire_canvas(document: &Document, config: &CubeConfig) -> Result<HtmlCanvasElement, CubeError> {
    if let Some(el) = document.get_element_by_id(&config.canvas_id) {
        return el
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| CubeError::NoCanvas(config.canvas_id.clone()));
    }

    let body = document
        .body()
        .ok_or_else(|| CubeError::Dom("no body on document".into()))?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| CubeError::Dom(format!("{e:?}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| CubeError::NoCanvas(config.canvas_id.clone()))?;
    canvas.set_id(&config.canvas_id);
    canvas.set_width(config.initial_width);
    canvas.set_height(config.initial_height);
    body.append_child(&canvas)
        .map_err(|e| CubeError::Dom(format!("{e:?}")))?;
    Ok(canvas)
}

/// Pointer listeners on the canvas. Every handler runs to completion on the
/// main thread, so the frame callback never observes a half-applied event.
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    canvas: &HtmlCanvasElement,
    frame_ctx: Rc<RefCell<FrameLoopContext>>,
) -> Result<(), JsValue> {
    add_pointer_listener(canvas, &frame_ctx, "mousedown", input::wasm::mouse_down_to_input)?;
    add_pointer_listener(canvas, &frame_ctx, "mouseup", |_| InputEvent::PointerUp)?;
    add_pointer_listener(canvas, &frame_ctx, "mouseout", |_| InputEvent::PointerLeave)?;
    add_pointer_listener(canvas, &frame_ctx, "mousemove", input::wasm::mouse_move_to_input)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn add_pointer_listener(
    canvas: &HtmlCanvasElement,
    frame_ctx: &Rc<RefCell<FrameLoopContext>>,
    event_name: &str,
    to_input: fn(&MouseEvent) -> InputEvent,
) -> Result<(), JsValue> {
    let frame_ctx = frame_ctx.clone();
    let canvas_for_size = canvas.clone();
    let listener = Closure::wrap(Box::new(move |e: MouseEvent| {
        let viewport = (canvas_for_size.width(), canvas_for_size.height());
        let disposition = frame_ctx.borrow_mut().handle_input(&to_input(&e), viewport);
        if disposition.is_consumed() {
            e.prevent_default();
        }
    }) as Box<dyn FnMut(MouseEvent)>);
    canvas.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref())?;
    listener.forget();
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn report_fatal(window: &Window, err: &CubeError) {
    tracing::error!("fatal: {err}");
    let message = if err.is_context_failure() {
        format!("WebGPU/WebGL not supported: {err}")
    } else {
        err.to_string()
    };
    let _ = window.alert_with_message(&message);
}

/// requestAnimationFrame loop. The wrapped closure gets the frame timestamp
/// in milliseconds and returns whether the loop should keep running.
#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut(f64) -> bool>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut(f64) -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut(f64)>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |time: f64| {
            if !inner.borrow_mut().as_mut()(time) {
                tracing::error!("frame loop stopped");
                return;
            }
            // Re-queue rather than recurse
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut(f64)>));

        // First frame runs synchronously at t = 0, like a direct call
        if self.inner.borrow_mut().as_mut()(0.0) {
            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}
