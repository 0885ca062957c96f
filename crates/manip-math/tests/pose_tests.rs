// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use std::f64::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use manip_math::{Pose, Quat, Vec3};
use proptest::prelude::*;

fn assert_vec_close(a: Vec3, b: Vec3) {
    for (x, y) in a.to_array().iter().zip(b.to_array().iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
    }
}

#[test]
fn quarter_turn_about_z_maps_x_to_y() {
    let q = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2);
    assert_vec_close(q.rotate(&Vec3::UNIT_X), Vec3::UNIT_Y);
}

#[test]
fn compose_applies_right_operand_first() {
    let lift = Pose::from_translation(Vec3::new(0.0, 0.0, 1.0));
    let turn = Pose::from_rotation(Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2));
    let p = lift.compose(&turn).transform_point(&Vec3::UNIT_X);
    assert_vec_close(p, Vec3::new(0.0, 1.0, 1.0));
}

#[test]
fn log6_of_identity_is_zero() {
    assert_eq!(Pose::identity().log6(), [0.0; 6]);
}

#[test]
fn rotation_vector_takes_short_way_round() {
    // -q encodes the same rotation as q; the log must not report 2π - θ.
    let q = Quat::from_axis_angle(Vec3::UNIT_X, 0.3);
    let [x, y, z, w] = q.to_array();
    let flipped = Quat::new(-x, -y, -z, -w);
    assert_vec_close(flipped.to_rotation_vector(), Vec3::new(0.3, 0.0, 0.0));
}

proptest! {
    #[test]
    fn pose_times_inverse_is_identity(
        t in prop::array::uniform3(-5.0f64..5.0),
        r in prop::array::uniform3(-1.5f64..1.5),
    ) {
        let pose = Pose::new(Vec3::from(t), Quat::from_rotation_vector(Vec3::from(r)));
        let log = pose.compose(&pose.inverse()).log6();
        for v in log {
            prop_assert!(v.abs() < 1e-9, "residual {v}");
        }
    }

    #[test]
    fn rotation_vector_log_inverts_exp(r in prop::array::uniform3(-1.5f64..1.5)) {
        let q = Quat::from_rotation_vector(Vec3::from(r));
        let back = q.to_rotation_vector().to_array();
        for (a, b) in back.iter().zip(r.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }
}
