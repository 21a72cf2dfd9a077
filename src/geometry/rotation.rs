//! Euler rotation in degrees
//!
//! Axes are applied X, then Y, then Z, each to the running point. The
//! "inverse" negates the angles and keeps that same order. For compound
//! rotations this is not the true inverse; every local-space test in
//! `shape` is built on this convention, so it must stay as is.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Object orientation, angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerRotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerRotation {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same axes, negated angles
    pub fn negated(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    /// Rotate about X, then Y, then Z
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let (sx, cx) = self.x.to_radians().sin_cos();
        let p = Vec3::new(p.x, p.y * cx - p.z * sx, p.y * sx + p.z * cx);

        let (sy, cy) = self.y.to_radians().sin_cos();
        let p = Vec3::new(p.x * cy + p.z * sy, p.y, -p.x * sy + p.z * cy);

        let (sz, cz) = self.z.to_radians().sin_cos();
        Vec3::new(p.x * cz - p.y * sz, p.x * sz + p.y * cz, p.z)
    }

    /// Negated angles applied in the same X, Y, Z order
    #[inline]
    pub fn apply_inverse(&self, p: Vec3) -> Vec3 {
        self.negated().apply(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_quarter_turns() {
        let x = Vec3::X;
        let r = EulerRotation::new(0.0, 0.0, 90.0);
        assert!(approx(r.apply(x), Vec3::Y));

        let r = EulerRotation::new(90.0, 0.0, 0.0);
        assert!(approx(r.apply(Vec3::Y), Vec3::Z));

        let r = EulerRotation::new(0.0, 90.0, 0.0);
        assert!(approx(r.apply(Vec3::Z), Vec3::X));
    }

    #[test]
    fn test_order_is_x_then_y_then_z() {
        // X first sends Y to Z, then Y=90 sends Z to X
        let r = EulerRotation::new(90.0, 90.0, 0.0);
        assert!(approx(r.apply(Vec3::Y), Vec3::X));
    }

    #[test]
    fn test_identity() {
        let p = Vec3::new(0.3, -1.2, 4.0);
        assert!(approx(EulerRotation::IDENTITY.apply(p), p));
    }

    #[test]
    fn test_compound_inverse_is_not_exact() {
        let r = EulerRotation::new(40.0, 70.0, 0.0);
        let p = Vec3::new(1.0, 0.5, -0.25);
        let back = r.apply(r.apply_inverse(p));
        assert!(!approx(back, p));
    }

    proptest! {
        #[test]
        fn single_axis_round_trip(angle in -360.0f32..360.0, axis in 0usize..3,
                                  x in -5.0f32..5.0, y in -5.0f32..5.0, z in -5.0f32..5.0) {
            let mut r = EulerRotation::IDENTITY;
            match axis {
                0 => r.x = angle,
                1 => r.y = angle,
                _ => r.z = angle,
            }
            let p = Vec3::new(x, y, z);
            prop_assert!(approx(r.apply(r.apply_inverse(p)), p));
            prop_assert!(approx(r.apply_inverse(r.apply(p)), p));
        }

        #[test]
        fn rotation_preserves_length(rx in 0.0f32..360.0, ry in 0.0f32..360.0, rz in 0.0f32..360.0,
                                     x in -5.0f32..5.0, y in -5.0f32..5.0, z in -5.0f32..5.0) {
            let p = Vec3::new(x, y, z);
            let q = EulerRotation::new(rx, ry, rz).apply(p);
            prop_assert!((p.length() - q.length()).abs() < 1e-3);
        }
    }
}
