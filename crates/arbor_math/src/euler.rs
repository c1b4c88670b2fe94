//! Euler angle view of a rotation

use serde::{Deserialize, Serialize};

use crate::quaternion::Quat;

/// Euler angles in radians, applied in XYZ order.
///
/// A convenience view for inspector-style UIs; the scene graph stores
/// rotations as quaternions and converts on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(self)
    }

    /// Extract XYZ angles from a quaternion via its rotation matrix.
    pub fn from_quat(q: Quat) -> Self {
        let m = q.normalize().to_mat4();

        // Column-major element names: m_rc = cols[c - 1] row r
        let m11 = m.cols[0].x;
        let m12 = m.cols[1].x;
        let m13 = m.cols[2].x;
        let m22 = m.cols[1].y;
        let m23 = m.cols[2].y;
        let m32 = m.cols[1].z;
        let m33 = m.cols[2].z;

        let y = m13.clamp(-1.0, 1.0).asin();

        if m13.abs() < 0.999_999_9 {
            Self::new((-m23).atan2(m33), y, (-m12).atan2(m11))
        } else {
            // Gimbal lock: fold the Z rotation into X
            Self::new(m32.atan2(m22), y, 0.0)
        }
    }

    pub fn approx_eq(self, other: Self, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}
