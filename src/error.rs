//! Fatal setup errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CubeError {
    #[error("no global `window`")]
    NoWindow,

    #[error("canvas `{0}` is not available")]
    NoCanvas(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("rendering context unavailable: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("no suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("shader compilation failed: {0}")]
    Shader(String),
}

impl CubeError {
    /// Whether the error means no rendering context could be acquired at all.
    pub fn is_context_failure(&self) -> bool {
        matches!(
            self,
            CubeError::NoWindow
                | CubeError::NoCanvas(_)
                | CubeError::Surface(_)
                | CubeError::NoSurfaceFormat
                | CubeError::Adapter(_)
                | CubeError::Device(_)
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl From<CubeError> for wasm_bindgen::JsValue {
    fn from(err: CubeError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_error_is_not_context_failure() {
        let err = CubeError::Shader("expected `;`".into());
        assert!(!err.is_context_failure());
        assert_eq!(err.to_string(), "shader compilation failed: expected `;`");
    }

    #[test]
    fn missing_canvas_is_context_failure() {
        let err = CubeError::NoCanvas("glcanvas".into());
        assert!(err.is_context_failure());
        assert_eq!(err.to_string(), "canvas `glcanvas` is not available");
    }
}
