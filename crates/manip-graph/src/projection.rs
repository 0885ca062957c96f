// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Building constraint sets from graph components and projecting onto them.
use nalgebra::DVector;
use tracing::debug;

use crate::constraint::{ConstraintSet, Constraints};
use crate::edge::EdgeKind;
use crate::error::{GraphError, Result};
use crate::graph::ConstraintGraph;
use crate::ComponentId;

/// Outcome of a projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Whether the output satisfies the constraints within the threshold.
    pub success: bool,
    /// The projected configuration (best effort when `success` is false).
    pub config: Vec<f64>,
    /// Error norm left by the projector; `None` when the set was empty.
    pub residual_error: Option<f64>,
}

impl Projection {
    /// Projects `q` onto `set` after anchoring it on `offset`, if any.
    pub fn compute(
        set: &mut ConstraintSet,
        offset: Option<&DVector<f64>>,
        mut q: DVector<f64>,
    ) -> Result<Self> {
        if let Some(anchor) = offset {
            set.offset_from_config(anchor)?;
        }
        let success = set.apply(&mut q)?;
        let residual_error = set.residual_error();
        debug!(set = set.name(), success, ?residual_error, "projection");
        Ok(Self {
            success,
            config: q.as_slice().to_vec(),
            residual_error,
        })
    }
}

impl ConstraintGraph {
    /// Constraints deciding membership of `node`: its subgraph's, then its
    /// own. Graph-wide constraints are added by the set builders.
    pub fn membership_constraints(&self, node: ComponentId) -> Result<Constraints> {
        let selector = self.node(node)?.selector();
        let mut constraints = Constraints::default();
        if let Some(selector) = selector {
            constraints.extend_from(self.component(selector)?.constraints());
        }
        constraints.extend_from(self.component(node)?.constraints());
        Ok(constraints)
    }

    /// Membership set of a single node, graph constraints included.
    pub fn node_constraint(&self, node: ComponentId) -> Result<ConstraintSet> {
        self.config_constraint_for_nodes(&[node])
    }

    /// The intersection of the listed nodes' manifolds.
    pub fn config_constraint_for_nodes(&self, nodes: &[ComponentId]) -> Result<ConstraintSet> {
        if nodes.is_empty() {
            return Err(GraphError::EmptyIdList);
        }
        let mut constraints = self.constraints().clone();
        let mut names = Vec::with_capacity(nodes.len());
        for &node in nodes {
            constraints.extend_from(&self.membership_constraints(node)?);
            names.push(self.component(node)?.name().to_owned());
        }
        Ok(ConstraintSet::new(names.join(", "), constraints, self.params()))
    }

    /// What a configuration reached through `edge` must satisfy, graph
    /// constraints excluded: the edge's own, the target node's membership
    /// constraints and, for level-set edges, the foliation.
    pub fn edge_config_constraints(&self, edge: ComponentId) -> Result<Constraints> {
        let e = self.edge(edge)?;
        let mut constraints = self.component(edge)?.constraints().clone();
        constraints.extend_from(&self.membership_constraints(e.target())?);
        if let EdgeKind::LevelSet(level_set) = e.kind() {
            constraints.extend_from(level_set.foliation());
        }
        Ok(constraints)
    }

    /// The intersection of the listed edges' configuration constraints.
    pub fn config_constraint_for_edges(&self, edges: &[ComponentId]) -> Result<ConstraintSet> {
        if edges.is_empty() {
            return Err(GraphError::EmptyIdList);
        }
        let mut constraints = self.constraints().clone();
        let mut names = Vec::with_capacity(edges.len());
        for &edge in edges {
            constraints.extend_from(&self.edge_config_constraints(edge)?);
            names.push(self.component(edge)?.name().to_owned());
        }
        Ok(ConstraintSet::new(names.join(", "), constraints, self.params()))
    }

    /// Constraints a path along `edge` must satisfy: the graph's, the
    /// edge's, and the path constraints of the node the edge lives in.
    pub fn path_constraint(&self, edge: ComponentId) -> Result<ConstraintSet> {
        let e = self.edge(edge)?;
        let component = self.component(edge)?;
        let mut constraints = self.constraints().clone();
        constraints.extend_from(component.constraints());
        constraints
            .numerical
            .extend(self.node(e.node())?.path_constraints().iter().cloned());
        Ok(ConstraintSet::new(
            format!("path({})", component.name()),
            constraints,
            self.params(),
        ))
    }

    /// Configuration constraint of a level-set edge with the foliation
    /// anchored on `leaf` and everything else anchored on `q_near`.
    pub fn level_set_constraint(
        &self,
        edge: ComponentId,
        q_near: &DVector<f64>,
        leaf: &DVector<f64>,
    ) -> Result<ConstraintSet> {
        let e = self.edge(edge)?;
        let component = self.component(edge)?;
        let EdgeKind::LevelSet(level_set) = e.kind() else {
            return Err(crate::graph::mismatch("level-set edge", component));
        };
        let mut constraints = self.constraints().clone();
        constraints.extend_from(component.constraints());
        constraints.extend_from(&self.membership_constraints(e.target())?);
        constraints.offset_from_config(q_near)?;
        let mut foliation = level_set.foliation().clone();
        foliation.offset_from_config(leaf)?;
        constraints.extend_from(&foliation);
        Ok(ConstraintSet::new(
            format!("leaf({})", component.name()),
            constraints,
            self.params(),
        ))
    }
}
