// VIEW: GPU setup and drawing
pub mod render;
pub mod gpu_init;

pub use render::{RenderState, SurfaceErrorAction, CUBE_SHADER};
pub use gpu_init::GpuContext;
