// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transitions between nodes.
use crate::level_set::LevelSet;
use crate::waypoint::WaypointChain;
use crate::ComponentId;

/// Variant-specific edge data.
#[derive(Debug, Clone)]
pub enum EdgeKind {
    /// A single atomic transition.
    Plain,
    /// The last segment of a chain through intermediate waypoint nodes.
    Waypoint(WaypointChain),
    /// A transition preserving a foliation parameter.
    LevelSet(LevelSet),
}

/// A transition from one node to another.
#[derive(Debug, Clone)]
pub struct Edge {
    from: ComponentId,
    to: ComponentId,
    weight: u32,
    in_node_from: bool,
    kind: EdgeKind,
    segment_of: Option<ComponentId>,
}

impl Edge {
    pub(crate) fn new(from: ComponentId, to: ComponentId, weight: u32, in_node_from: bool, kind: EdgeKind) -> Self {
        Self {
            from,
            to,
            weight,
            in_node_from,
            kind,
            segment_of: None,
        }
    }

    pub(crate) fn segment(from: ComponentId, to: ComponentId, in_node_from: bool, parent: ComponentId) -> Self {
        Self {
            segment_of: Some(parent),
            ..Self::new(from, to, 1, in_node_from, EdgeKind::Plain)
        }
    }

    /// Source node.
    pub fn source(&self) -> ComponentId {
        self.from
    }

    /// Target node.
    pub fn target(&self) -> ComponentId {
        self.to
    }

    /// Selection weight among the source node's outgoing edges.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Whether paths along this edge stay in the source node (else the target).
    pub fn is_in_node_from(&self) -> bool {
        self.in_node_from
    }

    /// The node whose path constraints apply along this edge.
    pub fn node(&self) -> ComponentId {
        if self.in_node_from {
            self.from
        } else {
            self.to
        }
    }

    /// Variant data.
    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    /// The waypoint edge owning this segment, for private chain segments.
    pub fn segment_of(&self) -> Option<ComponentId> {
        self.segment_of
    }

    /// Waypoint chain, for waypoint edges.
    pub fn waypoint_chain(&self) -> Option<&WaypointChain> {
        match &self.kind {
            EdgeKind::Waypoint(chain) => Some(chain),
            _ => None,
        }
    }

    /// Level-set data, for level-set edges.
    pub fn level_set(&self) -> Option<&LevelSet> {
        match &self.kind {
            EdgeKind::LevelSet(level_set) => Some(level_set),
            _ => None,
        }
    }

    pub(crate) fn set_in_node_from(&mut self, value: bool) {
        self.in_node_from = value;
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EdgeKind {
        &mut self.kind
    }
}
