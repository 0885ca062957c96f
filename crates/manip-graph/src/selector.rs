// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subgraphs and configuration classification.
use std::cmp::Reverse;

use nalgebra::DVector;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::graph::ConstraintGraph;
use crate::ComponentId;

/// A group of nodes a configuration is classified into.
#[derive(Debug, Clone, Default)]
pub struct NodeSelector {
    nodes: Vec<ComponentId>,
}

impl NodeSelector {
    /// Nodes in creation order.
    pub fn nodes(&self) -> &[ComponentId] {
        &self.nodes
    }

    pub(crate) fn push_node(&mut self, node: ComponentId) {
        self.nodes.push(node);
    }
}

impl ConstraintGraph {
    /// Order in which the nodes of `selector` are tried: most constrained
    /// first, creation order among equals.
    pub fn classification_order(&self, selector: ComponentId) -> Result<Vec<ComponentId>> {
        let mut ranked = self
            .selector(selector)?
            .nodes()
            .iter()
            .map(|&node| Ok((node, self.membership_constraints(node)?.dimension())))
            .collect::<Result<Vec<_>>>()?;
        // stable sort keeps creation order among equal specificity
        ranked.sort_by_key(|&(_, dim)| Reverse(dim));
        Ok(ranked.into_iter().map(|(node, _)| node).collect())
    }

    /// The node `q` belongs to.
    ///
    /// Subgraphs are scanned in creation order and the first node whose
    /// constraints `q` satisfies (within the graph's error threshold) wins.
    /// Nothing is cached, so repeated calls on an unchanged graph agree.
    pub fn get_node(&self, q: &DVector<f64>) -> Result<ComponentId> {
        for &selector in self.selectors() {
            for node in self.classification_order(selector)? {
                if self.node_constraint(node)?.is_satisfied(q)? {
                    debug!(%node, %selector, "configuration classified");
                    return Ok(node);
                }
            }
        }
        warn!(graph = self.name(), "no node accepts the configuration");
        Err(GraphError::NoMatchingNode)
    }
}
