/// Fixed parameters of the cube demo. There is no config file; every value
/// here is a compile-time default.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Distance the view matrix pushes the cube away from the eye (along -z).
    pub view_distance: f32,
    /// Per-frame decay of the angular velocity while the pointer is released.
    pub amortization: f32,
    pub clear_color: [f64; 4],
    pub clear_depth: f32,
    /// DOM id of the canvas to render into (web only).
    pub canvas_id: String,
    pub initial_width: u32,
    pub initial_height: u32,
    pub debug_overlay: bool,
}

impl Default for CubeConfig {
    fn default() -> Self {
        let (initial_width, initial_height) = if cfg!(target_arch = "wasm32") {
            (800, 600)
        } else {
            (1280, 720)
        };

        Self {
            fov_y_degrees: 40.0,
            z_near: 1.0,
            z_far: 100.0,
            view_distance: 6.0,
            amortization: 0.95,
            clear_color: [0.5, 0.5, 0.5, 0.9],
            clear_depth: 1.0,
            canvas_id: "glcanvas".to_string(),
            initial_width,
            initial_height,
            debug_overlay: cfg!(debug_assertions),
        }
    }
}

impl CubeConfig {
    /// Aspect ratio for a surface of the given size. A zero height falls back to 1.0.
    pub fn aspect_for(width: u32, height: u32) -> f32 {
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_constants() {
        let cfg = CubeConfig::default();
        assert_eq!(cfg.fov_y_degrees, 40.0);
        assert_eq!(cfg.z_near, 1.0);
        assert_eq!(cfg.z_far, 100.0);
        assert_eq!(cfg.view_distance, 6.0);
        assert_eq!(cfg.amortization, 0.95);
        assert_eq!(cfg.clear_color, [0.5, 0.5, 0.5, 0.9]);
        assert_eq!(cfg.clear_depth, 1.0);
        assert_eq!(cfg.canvas_id, "glcanvas");
    }

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(CubeConfig::aspect_for(800, 400), 2.0);
        assert_eq!(CubeConfig::aspect_for(800, 0), 1.0);
    }
}
