// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Waypoint edges: transitions split into a linear chain of segments.
//!
//! A waypoint edge with `n` segments from `a` to `b` reads
//!
//! ```text
//! a --base_e1--> base_n1 --base_e2--> ... base_n{n-1} --base_e{n}--> b
//! ```
//!
//! The last segment is the edge callers see: it carries the caller's id and
//! weight and is the one listed among `a`'s outgoing edges. The other
//! segments and the waypoint nodes are private to the chain; they belong to
//! no subgraph, so classification never returns them.
use tracing::debug;

use crate::component::ComponentKind;
use crate::edge::{Edge, EdgeKind};
use crate::error::{GraphError, Result};
use crate::graph::{mismatch, ConstraintGraph};
use crate::node::Node;
use crate::ComponentId;

/// Ids of a waypoint edge's chain, source to target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaypointChain {
    segments: Vec<ComponentId>,
    waypoints: Vec<ComponentId>,
}

impl WaypointChain {
    /// All segments; the last one is the waypoint edge itself.
    pub fn segments(&self) -> &[ComponentId] {
        &self.segments
    }

    /// Intermediate nodes; `waypoints[k]` is the target of `segments[k]`.
    pub fn waypoints(&self) -> &[ComponentId] {
        &self.waypoints
    }
}

/// A component id with its current name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphElement {
    /// Component id.
    pub id: ComponentId,
    /// Component name.
    pub name: String,
}

/// Ordered nodes and edges, as handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphElements {
    /// Nodes in source to target order.
    pub nodes: Vec<GraphElement>,
    /// Edges in source to target order.
    pub edges: Vec<GraphElement>,
}

impl ConstraintGraph {
    /// Creates a waypoint edge of `n` segments named `base_e1 ..= base_e{n}`
    /// through `n - 1` nodes named `base_n1 ..= base_n{n-1}`.
    ///
    /// Returns the chain; its last edge is the caller-facing id.
    pub fn create_waypoint_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        base: &str,
        n: usize,
        weight: u32,
        in_node_from: bool,
    ) -> Result<GraphElements> {
        if n < 1 {
            return Err(GraphError::InvalidArgument(format!(
                "waypoint edge `{base}` needs at least one segment"
            )));
        }
        let kind = EdgeKind::Waypoint(WaypointChain::default());
        let last = self.insert_edge(
            from,
            to,
            &format!("{base}_e{n}"),
            Edge::new(from, to, weight, in_node_from, kind),
        )?;

        let mut chain = WaypointChain::default();
        let mut previous = from;
        for k in 1..n {
            let waypoint = self.register_detached(
                &format!("{base}_n{k}"),
                ComponentKind::Node(Node::waypoint(last)),
            );
            let segment = self.register_detached(
                &format!("{base}_e{k}"),
                ComponentKind::Edge(Edge::segment(previous, waypoint, in_node_from, last)),
            );
            chain.segments.push(segment);
            chain.waypoints.push(waypoint);
            previous = waypoint;
        }
        chain.segments.push(last);
        *self.edge_mut(last)?.kind_mut() = EdgeKind::Waypoint(chain);
        debug!(edge = base, id = %last, segments = n, "waypoint edge created");
        self.waypoint_chain(last)
    }

    /// The chain behind a waypoint edge, with current names.
    pub fn waypoint_chain(&self, edge: ComponentId) -> Result<GraphElements> {
        let chain = self.chain(edge)?;
        let element = |id: ComponentId| {
            Ok(GraphElement {
                id,
                name: self.component(id)?.name().to_owned(),
            })
        };
        Ok(GraphElements {
            nodes: chain.waypoints().iter().map(|&id| element(id)).collect::<Result<_>>()?,
            edges: chain.segments().iter().map(|&id| element(id)).collect::<Result<_>>()?,
        })
    }

    /// First segment of a waypoint edge and the waypoint node it reaches,
    /// renamed `<edge>_waypoint` and `<edge>_waypoint_node`.
    ///
    /// A single-segment edge has no intermediate waypoint (`NotFound`).
    pub fn get_waypoint(&mut self, edge: ComponentId) -> Result<(ComponentId, ComponentId)> {
        let chain = self.chain(edge)?;
        let (Some(&segment), Some(&node)) = (chain.segments().first(), chain.waypoints().first())
        else {
            return Err(GraphError::NotFound(format!(
                "waypoint edge {edge} has no intermediate waypoint"
            )));
        };
        let base = self.component(edge)?.name().to_owned();
        self.set_name(segment, &format!("{base}_waypoint"))?;
        self.set_name(node, &format!("{base}_waypoint_node"))?;
        Ok((segment, node))
    }

    fn chain(&self, edge: ComponentId) -> Result<&WaypointChain> {
        let component = self.component(edge)?;
        component
            .as_edge()
            .and_then(|e| e.waypoint_chain())
            .ok_or_else(|| mismatch("waypoint edge", component))
    }
}
