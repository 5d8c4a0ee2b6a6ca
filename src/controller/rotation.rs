use glam::Mat4;

use super::input::DragState;

#[rustfmt::skip]
const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Rotate the x/z rows of every basis column by `angle` (yaw).
/// `m` is column-major.
pub fn rotate_yaw(m: &mut [f32; 16], angle: f32) {
    let (s, c) = angle.sin_cos();
    let (m0, m4, m8) = (m[0], m[4], m[8]);

    m[0] = c * m[0] + s * m[2];
    m[4] = c * m[4] + s * m[6];
    m[8] = c * m[8] + s * m[10];

    m[2] = c * m[2] - s * m0;
    m[6] = c * m[6] - s * m4;
    m[10] = c * m[10] - s * m8;
}

/// Rotate the y/z rows of every basis column by `angle` (pitch).
pub fn rotate_pitch(m: &mut [f32; 16], angle: f32) {
    let (s, c) = angle.sin_cos();
    let (m1, m5, m9) = (m[1], m[5], m[9]);

    m[1] = m[1] * c - m[2] * s;
    m[5] = m[5] * c - m[6] * s;
    m[9] = m[9] * c - m[10] * s;

    m[2] = m[2] * c + m1 * s;
    m[6] = m[6] * c + m5 * s;
    m[10] = m[10] * c + m9 * s;
}

/// Model matrix for the given orientation: identity, then yaw, then pitch.
///
/// Pitch therefore acts in the already-yawed frame.
pub fn model_from_angles(theta: f32, phi: f32) -> Mat4 {
    let mut m = IDENTITY;
    rotate_yaw(&mut m, theta);
    rotate_pitch(&mut m, phi);
    Mat4::from_cols_array(&m)
}

/// Per-frame model update. While the pointer is released the drag velocity
/// decays and keeps turning the cube; the matrix is then rebuilt from scratch.
pub fn rebuild_model(drag: &mut DragState, amortization: f32) -> Mat4 {
    if !drag.dragging {
        drag.coast(amortization);
    }
    model_from_angles(drag.theta, drag.phi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn assert_orthonormal(m: Mat4) {
        let a = m.to_cols_array();
        // Rows of the upper-left 3x3
        let rows: Vec<Vec3> = (0..3)
            .map(|r| Vec3::new(a[r], a[4 + r], a[8 + r]))
            .collect();
        for (i, ri) in rows.iter().enumerate() {
            assert!((ri.length() - 1.0).abs() < 1e-5, "row {i} not unit: {ri:?}");
            for rj in rows.iter().skip(i + 1) {
                assert!(ri.dot(*rj).abs() < 1e-5, "rows not orthogonal: {ri:?} {rj:?}");
            }
        }
    }

    #[test]
    fn zero_angles_give_identity() {
        assert_eq!(model_from_angles(0.0, 0.0), Mat4::IDENTITY);
    }

    #[test]
    fn model_is_orthonormal_for_many_angles() {
        for i in -20..20 {
            for j in -20..20 {
                assert_orthonormal(model_from_angles(i as f32 * 0.37, j as f32 * 0.53));
            }
        }
        assert_orthonormal(model_from_angles(1234.5, -987.25));
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let a = model_from_angles(0.731, -2.25).to_cols_array();
        let b = model_from_angles(0.731, -2.25).to_cols_array();
        assert_eq!(a.map(f32::to_bits), b.map(f32::to_bits));
    }

    #[test]
    fn yaw_matches_rotation_about_y() {
        let angle = 0.8;
        let expected = Mat4::from_rotation_y(angle);
        let got = model_from_angles(angle, 0.0);
        assert!(got.abs_diff_eq(expected, 1e-6), "{got:?} vs {expected:?}");
    }

    #[test]
    fn pitch_matches_rotation_about_x() {
        let angle = -0.4;
        let expected = Mat4::from_rotation_x(angle);
        let got = model_from_angles(0.0, angle);
        assert!(got.abs_diff_eq(expected, 1e-6), "{got:?} vs {expected:?}");
    }

    #[test]
    fn pitch_is_applied_after_yaw() {
        let (theta, phi) = (0.6, 0.9);
        let expected = Mat4::from_rotation_x(phi) * Mat4::from_rotation_y(theta);
        let got = model_from_angles(theta, phi);
        assert!(got.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn translation_column_is_untouched() {
        let m = model_from_angles(2.0, 3.0).to_cols_array();
        assert_eq!(&m[12..16], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!([m[3], m[7], m[11]], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn idle_frames_decay_velocity() {
        let mut drag = DragState { velocity: (0.05, 0.02), ..DragState::new() };
        for _ in 0..10 {
            rebuild_model(&mut drag, 0.95);
        }
        let factor = 0.95f32.powi(10);
        assert!((drag.velocity.0 - 0.05 * factor).abs() < 1e-7);
        assert!((drag.velocity.1 - 0.02 * factor).abs() < 1e-7);
    }

    #[test]
    fn dragging_freezes_inertia() {
        let mut drag = DragState {
            dragging: true,
            velocity: (0.05, 0.02),
            theta: 1.0,
            phi: 0.5,
            ..DragState::new()
        };
        let m = rebuild_model(&mut drag, 0.95);
        assert_eq!(drag.velocity, (0.05, 0.02));
        assert_eq!((drag.theta, drag.phi), (1.0, 0.5));
        assert_eq!(m, model_from_angles(1.0, 0.5));
    }
}
