// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]
use std::sync::Arc;

use manip_graph::robot::{Device, JointKind};
use manip_graph::constraint::RelativeTransformation;
use manip_graph::{ComparisonType, ComponentId, ProblemSolver};
use manip_math::{Pose, Vec3};

/// Routes `tracing` output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Planar two-link arm: `joint1` and `joint2`, both about z.
pub fn two_joint_robot() -> Device {
    let mut robot = Device::new("robot");
    robot
        .add_joint("joint1", None, Pose::identity(), JointKind::Revolute { axis: Vec3::UNIT_Z })
        .expect("joint1");
    robot
        .add_joint(
            "joint2",
            Some("joint1"),
            Pose::from_translation(Vec3::UNIT_X),
            JointKind::Revolute { axis: Vec3::UNIT_Z },
        )
        .expect("joint2");
    robot
}

/// Graph G with subgraph S, free node N1, node N2 locking joint1 at 0.5 and
/// edge E from N1 to N2.
pub struct Scenario {
    pub solver: ProblemSolver,
    pub graph: ComponentId,
    pub subgraph: ComponentId,
    pub n1: ComponentId,
    pub n2: ComponentId,
    pub edge: ComponentId,
}

pub fn scenario() -> Scenario {
    init_tracing();
    let mut solver = ProblemSolver::new();
    solver.set_robot(two_joint_robot());
    solver
        .create_locked_dof_constraint("lock_joint1", "joint1", 0.5)
        .expect("locked dof");
    let graph = solver.create_graph("G").expect("graph");
    let subgraph = solver.create_sub_graph("S").expect("subgraph");
    let n1 = solver.create_node(subgraph, "N1").expect("N1");
    let n2 = solver.create_node(subgraph, "N2").expect("N2");
    solver
        .set_locked_dof_constraints(n2, &["lock_joint1"])
        .expect("lock N2");
    let edge = solver.create_edge(n1, n2, "E", 1, true).expect("E");
    Scenario {
        solver,
        graph,
        subgraph,
        n1,
        n2,
        edge,
    }
}

fn planar_body(name: &str) -> Device {
    let mut body = Device::new(name);
    body.add_joint("x", None, Pose::identity(), JointKind::Prismatic { axis: Vec3::UNIT_X })
        .expect("x");
    body.add_joint("y", Some("x"), Pose::identity(), JointKind::Prismatic { axis: Vec3::UNIT_Y })
        .expect("y");
    body
}

/// A planar `arm` (gripper `tool`) and a planar `box` (handle `handle`).
pub fn planar_parts() -> [Device; 2] {
    let mut arm = planar_body("arm");
    arm.add_gripper("tool", "y", Pose::identity()).expect("tool");
    let mut object = planar_body("box");
    object
        .add_handle("handle", "y", Pose::identity())
        .expect("handle");
    [arm, object]
}

/// Session on the composite of [`planar_parts`]
/// (`[arm.x, arm.y, box.x, box.y]`) with a relative-pose constraint `hold`
/// (tool to handle, anchored by offset) registered.
pub fn planar_session() -> ProblemSolver {
    init_tracing();
    let mut solver = ProblemSolver::new();
    solver.build_composite_robot("scene", &planar_parts());
    let robot = Arc::clone(solver.robot().expect("robot"));
    let tool = robot.gripper("arm/tool").expect("tool").clone();
    let handle = robot.handle("box/handle").expect("handle").clone();
    let hold = RelativeTransformation::new(
        "hold",
        robot,
        (tool.joint(), tool.local()),
        (handle.joint(), handle.local()),
    );
    solver.add_numerical_constraint("hold", Arc::new(hold), ComparisonType::Equality);
    solver
}

pub fn assert_close(a: &[f64], b: &[f64], epsilon: f64) {
    assert_eq!(a.len(), b.len(), "{a:?} vs {b:?}");
    for (x, y) in a.iter().zip(b) {
        approx::assert_abs_diff_eq!(*x, *y, epsilon = epsilon);
    }
}
