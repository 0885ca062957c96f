// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! manip-graph: the manipulation constraint graph.
//!
//! A [`ConstraintGraph`] is a discrete structure laid over a robot's
//! configuration space. Nodes are modes ("object on the table", "object in
//! the gripper") defined by numerical constraints; edges are admissible
//! transitions carrying their own constraints. Callers build the graph
//! incrementally through [`ProblemSolver`], referring to every element by an
//! opaque [`ComponentId`], then query it:
//!
//! * classification: which node does a configuration belong to
//!   ([`ProblemSolver::get_node`]);
//! * projection: move a configuration onto the manifold of a list of nodes or
//!   edges ([`ProblemSolver::apply_constraints`],
//!   [`ProblemSolver::apply_constraints_with_offset`]);
//! * extension: one graph-aware planner step ([`ProblemSolver::extend`]).
//!
//! The graph is append-only for the lifetime of a session. Creating a new
//! graph drops the previous one; ids of the dropped graph stop resolving.
#![forbid(unsafe_code)]

/// Session configuration (solver, planner, histogram parameters).
pub mod config;
/// Numerical constraints, locked joints and the configuration projector.
pub mod constraint;
/// Roadmap collaborators and foliation statistics.
pub mod roadmap;
/// Planner collaborators and the graph-aware extension step.
pub mod planner;
/// Kinematic robot model used by pose constraints.
pub mod robot;

mod builder;
mod component;
mod dot;
mod edge;
mod error;
mod graph;
mod graph_ops;
mod histogram;
mod ident;
mod level_set;
mod node;
mod problem;
mod projection;
mod registry;
mod selector;
mod waypoint;

pub use builder::GraphBuilder;
pub use component::{Component, ComponentKind};
pub use config::{HistogramParams, PlannerParams, SessionConfig, SolverParams};
pub use constraint::{
    ComparisonType, ConfigProjector, ConstraintSet, Constraints, DifferentiableFunction,
    LockedJoint, NumericalConstraint, SolverError,
};
pub use edge::{Edge, EdgeKind};
pub use error::{GraphError, Result};
pub use graph::ConstraintGraph;
pub use histogram::{Foliation, HistogramKey, LeafBin, LeafHistogram};
pub use ident::{ComponentId, IdRegistry};
pub use level_set::LevelSet;
pub use node::Node;
pub use problem::ProblemSolver;
pub use projection::Projection;
pub use registry::ConstraintRegistry;
pub use selector::NodeSelector;
pub use waypoint::{GraphElement, GraphElements, WaypointChain};

/// A robot configuration: one entry per configuration-space coordinate.
pub type Configuration = nalgebra::DVector<f64>;
