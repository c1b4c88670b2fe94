//! 4x4 transformation matrix (column-major)

use core::ops::{Mul, MulAssign};
use serde::{Deserialize, Serialize};

use crate::quaternion::Quat;
use crate::vector::{Vec3, Vec4};

/// 4x4 matrix (column-major) - the main transformation matrix
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO, Vec4::ZERO, Vec4::ZERO, Vec4::ZERO],
    };

    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, translation.extend(1.0))
    }

    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::W,
        )
    }

    /// Build a local matrix from position, rotation, and scale: `T * R * S`.
    ///
    /// Every local matrix in the scene graph is derived through this one
    /// function so cached matrices stay bit-comparable.
    pub fn compose(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut m = rotation.to_mat4();
        m.cols[0] = m.cols[0] * scale.x;
        m.cols[1] = m.cols[1] * scale.y;
        m.cols[2] = m.cols[2] * scale.z;
        m.cols[3] = position.extend(1.0);
        m
    }

    /// Translation column.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Transform a point (w = 1).
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let r = self.cols[0] * p.x + self.cols[1] * p.y + self.cols[2] * p.z + self.cols[3];
        r.truncate()
    }

    /// Flattened column-major array, matching the serialized layout.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, col) in self.cols.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&col.to_array());
        }
        out
    }

    /// Element-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.to_cols_array()
            .iter()
            .zip(other.to_cols_array().iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut cols = [Vec4::ZERO; 4];
        for (out, c) in cols.iter_mut().zip(rhs.cols.iter()) {
            *out = self.cols[0] * c.x + self.cols[1] * c.y + self.cols[2] * c.z + self.cols[3] * c.w;
        }
        Self { cols }
    }
}

impl MulAssign for Mat4 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_multiplication() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert!((Mat4::IDENTITY * m).approx_eq(&m, 1e-6));
        assert!((m * Mat4::IDENTITY).approx_eq(&m, 1e-6));
    }

    #[test]
    fn compose_equals_trs_product() {
        let p = Vec3::new(1.0, -2.0, 0.5);
        let r = Quat::from_rotation_y(0.9);
        let s = Vec3::new(2.0, 2.0, 0.5);

        let composed = Mat4::compose(p, r, s);
        let product = Mat4::from_translation(p) * r.to_mat4() * Mat4::from_scale(s);
        assert!(composed.approx_eq(&product, 1e-6));
    }

    #[test]
    fn transform_point_applies_srt_order() {
        let m = Mat4::compose(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(2.0),
        );
        let r = m.transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert!(r.approx_eq(Vec3::new(12.0, 2.0, 2.0), 1e-6));
    }
}
