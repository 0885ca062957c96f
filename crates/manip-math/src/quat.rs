// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::{Vec3, EPSILON};

/// Unit quaternion stored as `(x, y, z, w)`; angles are radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quat {
    data: [f64; 4],
}

impl Quat {
    /// Creates a quaternion from raw components. No normalisation.
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// The identity rotation.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Returns the quaternion as an array.
    pub fn to_array(self) -> [f64; 4] {
        self.data
    }

    fn vector(&self) -> Vec3 {
        Vec3::new(self.data[0], self.data[1], self.data[2])
    }

    fn scalar(&self) -> f64 {
        self.data[3]
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// Returns the identity when the axis is degenerate.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let len = axis.length();
        if len <= EPSILON {
            return Self::identity();
        }
        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let v = axis.scale(sin_half / len);
        Self::new(v.x(), v.y(), v.z(), cos_half)
    }

    /// Exponential map: rotation vector (axis scaled by angle) to quaternion.
    pub fn from_rotation_vector(rotation: Vec3) -> Self {
        let angle = rotation.length();
        if angle <= EPSILON {
            let half = rotation.scale(0.5);
            return Self::new(half.x(), half.y(), half.z(), 1.0).normalize();
        }
        Self::from_axis_angle(rotation, angle)
    }

    /// Logarithm map: the rotation vector of this quaternion, with the angle
    /// in `[0, π]`.
    pub fn to_rotation_vector(&self) -> Vec3 {
        let q = self.normalize();
        // q and -q encode the same rotation; pick the short way round.
        let q = if q.scalar() < 0.0 { q.negate() } else { q };
        let v = q.vector();
        let sin_half = v.length();
        if sin_half <= EPSILON {
            return v.scale(2.0);
        }
        let angle = 2.0 * sin_half.atan2(q.scalar());
        v.scale(angle / sin_half)
    }

    /// Hamilton product `self * other`: apply `other` first, then `self`.
    pub fn multiply(&self, other: &Self) -> Self {
        let [ax, ay, az, aw] = self.data;
        let [bx, by, bz, bw] = other.data;
        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Conjugate; the inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        let [x, y, z, w] = self.data;
        Self::new(-x, -y, -z, w)
    }

    fn negate(&self) -> Self {
        let [x, y, z, w] = self.data;
        Self::new(-x, -y, -z, -w)
    }

    /// Normalises the quaternion; identity when the norm vanishes.
    pub fn normalize(&self) -> Self {
        let [x, y, z, w] = self.data;
        let len = (x * x + y * y + z * z + w * w).sqrt();
        if len <= EPSILON {
            return Self::identity();
        }
        let inv = 1.0 / len;
        Self::new(x * inv, y * inv, z * inv, w * inv)
    }

    /// Rotates a vector.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        let q = self.normalize();
        let u = q.vector();
        let t = u.cross(v).scale(2.0);
        v.add(&t.scale(q.scalar())).add(&u.cross(&t))
    }
}

impl From<[f64; 4]> for Quat {
    fn from(value: [f64; 4]) -> Self {
        Self { data: value }
    }
}
