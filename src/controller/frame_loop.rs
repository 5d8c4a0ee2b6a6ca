use glam::Mat4;

use crate::config::CubeConfig;
use crate::model::{Camera, CUBE_INDEX_COUNT};

use super::input::{DragState, EventDisposition, InputEvent};
use super::rotation::rebuild_model;

/// A 4x4 matrix laid out for a `mat4x4<f32>` uniform binding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixUniform {
    pub matrix: [[f32; 4]; 4],
}

impl From<Mat4> for MatrixUniform {
    fn from(m: Mat4) -> Self {
        Self { matrix: m.to_cols_array_2d() }
    }
}

/// Everything that changes between frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubeState {
    pub drag: DragState,
    /// Timestamp of the previous frame, in milliseconds.
    pub last_time: f64,
}

/// What the view layer has to do to present one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCommands {
    pub time: f64,
    /// Milliseconds since the previous frame.
    pub dt: f64,
    pub clear_color: [f64; 4],
    pub clear_depth: f32,
    /// Viewport size in pixels, read from the surface this frame.
    pub viewport: (u32, u32),
    pub projection: MatrixUniform,
    pub view: MatrixUniform,
    pub model: MatrixUniform,
    pub index_count: u32,
}

/// Owns the cube state and is the only thing that mutates it. Pointer
/// callbacks and the frame callback both go through here.
pub struct FrameLoopContext {
    pub config: CubeConfig,
    pub camera: Camera,
    pub state: CubeState,
}

impl FrameLoopContext {
    /// `width`/`height` is the initial surface size; it fixes the projection
    /// aspect ratio for the lifetime of the context.
    pub fn new(config: CubeConfig, width: u32, height: u32) -> Self {
        let camera = Camera::new(&config, width, height);
        tracing::info!(width, height, fov = config.fov_y_degrees, "projection built");
        Self {
            config,
            camera,
            state: CubeState::default(),
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent, viewport: (u32, u32)) -> EventDisposition {
        let disposition = self.state.drag.process_event(event, viewport);
        tracing::trace!(?event, ?disposition, "pointer event");
        disposition
    }

    /// Advance one frame at timestamp `time` (milliseconds) and describe
    /// what to draw.
    pub fn update(&mut self, time: f64, viewport: (u32, u32)) -> FrameCommands {
        let dt = time - self.state.last_time;

        let model = rebuild_model(&mut self.state.drag, self.config.amortization);
        self.state.last_time = time;

        tracing::trace!(
            dt,
            theta = self.state.drag.theta,
            phi = self.state.drag.phi,
            "frame"
        );

        FrameCommands {
            time,
            dt,
            clear_color: self.config.clear_color,
            clear_depth: self.config.clear_depth,
            viewport,
            projection: self.camera.projection.into(),
            view: self.camera.view.into(),
            model: model.into(),
            index_count: CUBE_INDEX_COUNT as u32,
        }
    }
}
