// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::{Quat, Vec3};

/// Rigid transform: rotation followed by translation.
///
/// Conventions:
/// - `translation` in metres, expressed in the parent frame.
/// - `rotation` is a unit quaternion; callers need not pre-normalise.
/// - `a.compose(&b)` maps a point from `b`'s frame through `a` (`a * b`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    translation: Vec3,
    rotation: Quat,
}

impl Pose {
    /// The identity transform.
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::identity(),
        }
    }

    /// Creates a pose from components.
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Pure translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Pure rotation.
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Translation component.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// `self * other`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            translation: self
                .translation
                .add(&self.rotation.rotate(&other.translation)),
            rotation: self.rotation.multiply(&other.rotation).normalize(),
        }
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.normalize().conjugate();
        Self {
            translation: inv_rot.rotate(&self.translation).neg(),
            rotation: inv_rot,
        }
    }

    /// Maps a point expressed in this pose's local frame to the parent frame.
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.rotation.rotate(point).add(&self.translation)
    }

    /// Six-component error vector `[tx, ty, tz, rx, ry, rz]`: the translation
    /// followed by the rotation vector. Zero iff the pose is the identity.
    pub fn log6(&self) -> [f64; 6] {
        let [tx, ty, tz] = self.translation.to_array();
        let [rx, ry, rz] = self.rotation.to_rotation_vector().to_array();
        [tx, ty, tz, rx, ry, rz]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
