use glam::{Mat4, Vec3};

use crate::config::CubeConfig;

/// Projection and view transforms. Both are fixed once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub projection: Mat4,
    pub view: Mat4,
}

impl Camera {
    /// Builds the camera for a surface of `width` x `height`.
    ///
    /// The aspect ratio is taken from this initial size only; later resizes
    /// change the viewport but not the projection.
    pub fn new(config: &CubeConfig, width: u32, height: u32) -> Self {
        let aspect = CubeConfig::aspect_for(width, height);
        Self {
            projection: build_projection(config.fov_y_degrees, aspect, config.z_near, config.z_far),
            view: build_view(config.view_distance),
        }
    }
}

/// Perspective projection in column-major layout.
///
/// Preconditions (not validated at runtime): `far > near > 0`, `aspect > 0`,
/// `0 < fov_y_degrees < 180`.
pub fn build_projection(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    debug_assert!(far > near && near > 0.0, "clip planes must satisfy far > near > 0");
    debug_assert!(aspect > 0.0, "aspect ratio must be positive");
    debug_assert!(fov_y_degrees > 0.0 && fov_y_degrees < 180.0, "fov must be in (0, 180)");

    let t = (fov_y_degrees * 0.5 * std::f32::consts::PI / 180.0).tan();
    let depth = far - near;

    #[rustfmt::skip]
    let cols = [
        0.5 / t, 0.0,              0.0,                          0.0,
        0.0,     0.5 * aspect / t, 0.0,                          0.0,
        0.0,     0.0,              -(far + near) / depth,        -1.0,
        0.0,     0.0,              -2.0 * far * near / depth,    0.0,
    ];
    Mat4::from_cols_array(&cols)
}

/// Identity view pushed `distance` units down the -z axis.
pub fn build_view(distance: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-5 * b.abs().max(1.0)
    }

    #[test]
    fn projection_depth_terms() {
        let p = build_projection(40.0, 1.0, 1.0, 100.0).to_cols_array();
        assert!(close(p[10], -101.0 / 99.0), "entry(2,2) = {}", p[10]);
        assert!(close(p[14], -200.0 / 99.0), "entry(3,2) = {}", p[14]);
        assert_eq!(p[11], -1.0);
    }

    #[test]
    fn projection_scale_terms() {
        let t = 20f32.to_radians().tan();
        let p = build_projection(40.0, 2.0, 1.0, 100.0).to_cols_array();
        assert!(close(p[0], 0.5 / t));
        assert!(close(p[5], 0.5 * 2.0 / t));
    }

    #[test]
    fn projection_other_entries_are_zero() {
        let p = build_projection(40.0, 1.5, 1.0, 100.0).to_cols_array();
        for (i, v) in p.iter().enumerate() {
            if ![0, 5, 10, 11, 14].contains(&i) {
                assert_eq!(*v, 0.0, "entry {i} should be zero");
            }
        }
    }

    #[test]
    fn view_translates_along_negative_z() {
        let v = build_view(6.0).to_cols_array();
        assert_eq!(v[14], -6.0);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[5], 1.0);
        assert_eq!(v[10], 1.0);
        assert_eq!(v[15], 1.0);
    }

    #[test]
    fn camera_uses_initial_aspect() {
        let cfg = CubeConfig::default();
        let cam = Camera::new(&cfg, 1000, 500);
        let square = Camera::new(&cfg, 500, 500);
        let p = cam.projection.to_cols_array();
        let q = square.projection.to_cols_array();
        assert!(close(p[5], 2.0 * q[5]));
        assert_eq!(p[0], q[0]);
    }
}
