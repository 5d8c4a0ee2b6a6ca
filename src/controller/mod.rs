// CONTROLLER: pointer input, model rotation and the per-frame update
pub mod input;
pub mod rotation;
pub mod frame_loop;

pub use input::{DragState, EventDisposition, InputEvent};
pub use rotation::{model_from_angles, rebuild_model};
pub use frame_loop::{CubeState, FrameCommands, FrameLoopContext, MatrixUniform};
