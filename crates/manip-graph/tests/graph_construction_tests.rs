// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
mod common;

use manip_graph::{ComponentId, GraphBuilder, GraphError, ProblemSolver};
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use common::{scenario, two_joint_robot};

#[test]
fn graph_requires_a_robot() {
    let mut solver = ProblemSolver::new();
    assert!(matches!(
        solver.create_graph("G"),
        Err(GraphError::PreconditionViolation(_))
    ));
    assert!(matches!(
        solver.create_sub_graph("S"),
        Err(GraphError::PreconditionViolation(_))
    ));
}

#[test]
fn construction_resolves_ids_by_kind() {
    let mut s = scenario();
    assert!(matches!(
        s.solver.create_node(s.n1, "bad"),
        Err(GraphError::TypeMismatch { expected: "subgraph", .. })
    ));
    assert!(matches!(
        s.solver.create_edge(s.n1, s.subgraph, "bad", 1, true),
        Err(GraphError::TypeMismatch { expected: "node", .. })
    ));
    assert!(matches!(
        s.solver.set_is_in_node_from(s.n1, false),
        Err(GraphError::TypeMismatch { expected: "edge", .. })
    ));
    assert!(matches!(
        s.solver.set_numerical_constraints_for_path(s.edge, &[]),
        Err(GraphError::TypeMismatch { expected: "node", .. })
    ));
    let unknown = ComponentId::from_raw(u64::MAX);
    assert!(matches!(
        s.solver.set_is_in_node_from(unknown, true),
        Err(GraphError::NotFound(_))
    ));
    s.solver.set_is_in_node_from(s.edge, false).expect("flag");
    let graph = s.solver.graph().expect("graph");
    assert!(!graph.edge(s.edge).expect("edge").is_in_node_from());
    assert_eq!(graph.id(), s.graph);
}

#[test]
fn empty_name_lists_are_no_ops_but_ids_must_resolve() {
    let mut s = scenario();
    s.solver.set_numerical_constraints(s.n1, &[]).expect("no-op");
    s.solver.set_locked_dof_constraints(s.graph, &[]).expect("no-op");
    assert!(s.solver.graph().expect("graph").component(s.n1).expect("n1").constraints().is_empty());
    assert!(matches!(
        s.solver
            .set_numerical_constraints(ComponentId::from_raw(u64::MAX), &[]),
        Err(GraphError::NotFound(_))
    ));
}

#[test]
fn unknown_constraint_name_attaches_nothing() {
    let mut s = scenario();
    s.solver
        .create_locked_dof_constraint("lock_joint2", "joint2", 0.0)
        .expect("lock");
    let err = s
        .solver
        .set_locked_dof_constraints(s.n1, &["lock_joint2", "missing"])
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound(_)));
    let graph = s.solver.graph().expect("graph");
    assert!(graph.component(s.n1).expect("n1").constraints().is_empty());
}

#[test]
fn locked_dof_needs_a_moving_joint() {
    let mut solver = ProblemSolver::new();
    assert!(matches!(
        solver.create_locked_dof_constraint("l", "joint1", 0.0),
        Err(GraphError::PreconditionViolation(_))
    ));
    solver.set_robot(two_joint_robot());
    assert!(matches!(
        solver.create_locked_dof_constraint("l", "nope", 0.0),
        Err(GraphError::NotFound(_))
    ));
    solver.create_locked_dof_constraint("l", "joint2", 0.1).expect("lock");
    solver.is_locked_dof_parametric("l", true).expect("parametric");
    assert!(solver.constraints().locked_joint("l").expect("l").is_parametric());
    assert!(solver.is_locked_dof_parametric("other", true).is_err());
}

#[test]
fn a_new_graph_retires_the_old_ids() {
    let mut s = scenario();
    let g2 = s.solver.create_graph("G2").expect("graph");
    assert!(g2 > s.edge);
    assert!(matches!(
        s.solver.create_node(s.subgraph, "stale"),
        Err(GraphError::NotFound(_))
    ));
}

#[test]
fn waypoint_scenario_names_and_renames_the_chain() {
    let mut s = scenario();
    let chain = s
        .solver
        .create_waypoint_edge(s.n1, s.n2, "approach", 3, 1, true)
        .expect("waypoint edge");
    let edge_names: Vec<_> = chain.edges.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(edge_names, ["approach_e1", "approach_e2", "approach_e3"]);
    assert_eq!(chain.nodes.len(), 2);

    let returned = chain.edges[2].id;
    let graph = s.solver.graph().expect("graph");
    assert_eq!(graph.edge(chain.edges[0].id).expect("e1").target(), chain.nodes[0].id);
    assert_eq!(graph.edge(chain.edges[1].id).expect("e2").target(), chain.nodes[1].id);
    assert_eq!(graph.edge(returned).expect("e3").target(), s.n2);

    let (segment, node) = s.solver.get_waypoint(returned).expect("waypoint");
    assert_eq!(segment, chain.edges[0].id);
    assert_eq!(node, chain.nodes[0].id);
    let renamed = s.solver.waypoint_chain(returned).expect("chain");
    assert_eq!(renamed.edges[0].name, "approach_e3_waypoint");
    assert_eq!(renamed.nodes[0].name, "approach_e3_waypoint_node");
    assert_eq!(renamed.edges.last().map(|e| e.id), Some(returned));
}

#[test]
fn waypoint_chains_have_n_edges_and_n_minus_one_nodes() {
    for n in 1..6 {
        let mut s = scenario();
        let chain = s
            .solver
            .create_waypoint_edge(s.n1, s.n2, "w", n, 2, false)
            .expect("waypoint edge");
        assert_eq!(chain.edges.len(), n);
        assert_eq!(chain.nodes.len(), n - 1);
        let ids: Vec<_> = chain.edges.iter().map(|e| e.id).collect();
        assert_eq!(s.solver.waypoint_chain(ids[n - 1]).expect("chain"), chain);
    }
}

#[test]
fn ids_grow_in_creation_order() {
    const SEED_BYTES: [u8; 32] = [
        0x6d, 0x61, 0x6e, 0x69, 0x70, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::with_cases(32), rng);

    // 0 = subgraph, 1 = node, 2 = edge, 3 = waypoint edge
    let ops = prop::collection::vec(0u8..4, 1..40);
    runner
        .run(&ops, |ops| {
            let mut s = scenario();
            let mut last = s.edge;
            let mut nodes = vec![s.n1, s.n2];
            for (k, op) in ops.iter().enumerate() {
                let name = format!("c{k}");
                let created = match op {
                    0 => vec![s.solver.create_sub_graph(&name).expect("subgraph")],
                    1 => {
                        let id = s.solver.create_node(s.subgraph, &name).expect("node");
                        nodes.push(id);
                        vec![id]
                    }
                    2 => {
                        let (a, b) = (nodes[k % nodes.len()], nodes[(k + 1) % nodes.len()]);
                        vec![s.solver.create_edge(a, b, &name, 1, true).expect("edge")]
                    }
                    _ => {
                        let chain = s
                            .solver
                            .create_waypoint_edge(s.n1, s.n2, &name, 2, 1, true)
                            .expect("waypoint");
                        // the caller-facing edge is created before its private chain
                        vec![chain.edges[1].id, chain.nodes[0].id, chain.edges[0].id]
                    }
                };
                for id in created {
                    prop_assert!(id > last, "{id} after {last}");
                    last = id;
                }
            }
            Ok(())
        })
        .expect("ids increase");
}

#[test]
fn builder_creates_by_name() {
    let mut s = scenario();
    s.solver
        .create_locked_dof_constraint("lock_joint2", "joint2", -0.25)
        .expect("lock");
    let mut builder = GraphBuilder::new(&mut s.solver, "built").expect("builder");
    builder.create_nodes(&["held", "free"]).expect("nodes");
    let grab = builder
        .create_edge("free", "held", "grab", 2, None)
        .expect("grab");
    let release = builder
        .create_waypoint_edge("held", "free", "release", 2, 1, Some(true))
        .expect("release");
    builder
        .set_constraints("held", &[], &["lock_joint2"])
        .expect("constraints");
    assert_eq!(builder.edge("release_e2").expect("release"), release);
    assert!(builder.node("release_n1").is_ok());
    assert!(builder.edge("release_e1").is_ok());
    assert!(matches!(builder.node("nope"), Err(GraphError::NotFound(_))));
    let held = builder.node("held").expect("held");
    let free = builder.node("free").expect("free");
    let subgraph = builder.subgraph();

    let graph = s.solver.graph().expect("graph");
    assert_eq!(graph.name(), "built");
    assert_eq!(graph.component(subgraph).expect("sg").name(), "built_sg");
    // free was created after held, so grab's paths stay in free
    assert!(graph.edge(grab).expect("grab").is_in_node_from());
    assert_eq!(graph.component(held).expect("held").constraints().locked.len(), 1);
    assert_eq!(graph.node(free).expect("free").out_edges(), &[grab]);
}
