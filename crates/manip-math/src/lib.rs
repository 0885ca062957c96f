// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic math helpers for manipulation planning: 3D vectors,
//! quaternions, rigid poses and a seedable pseudo-random generator.
//!
//! Everything is `f64`. Configuration-space solvers live elsewhere; this crate
//! only covers the Cartesian side (frames, relative poses) and sampling.
#![forbid(unsafe_code)]

mod pose;
mod prng;
mod quat;
mod vec3;

pub use pose::Pose;
pub use prng::Prng;
pub use quat::Quat;
pub use vec3::Vec3;

/// Degeneracy threshold used when normalising vectors and quaternions.
pub const EPSILON: f64 = 1e-12;

/// Clamps `value` to `[min, max]`. Swapped bounds are reordered.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    value.max(lo).min(hi)
}

/// Wraps an angle in radians into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
