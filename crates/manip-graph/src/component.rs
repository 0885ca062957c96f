// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The closed set of graph component kinds.
use crate::constraint::Constraints;
use crate::edge::{Edge, EdgeKind};
use crate::node::Node;
use crate::selector::NodeSelector;
use crate::ComponentId;

/// Kind-specific payload of a [`Component`].
#[derive(Debug, Clone)]
pub enum ComponentKind {
    /// The graph root; its constraints apply to every node and edge.
    Graph,
    /// A subgraph grouping nodes for classification.
    Selector(NodeSelector),
    /// A mode.
    Node(Node),
    /// A transition (plain, waypoint or level-set).
    Edge(Edge),
}

impl ComponentKind {
    /// Short label used in error messages and graph output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Selector(_) => "subgraph",
            Self::Node(_) => "node",
            Self::Edge(edge) => match edge.kind() {
                EdgeKind::Plain => "edge",
                EdgeKind::Waypoint(_) => "waypoint edge",
                EdgeKind::LevelSet(_) => "level-set edge",
            },
        }
    }
}

/// Anything in the graph a caller can address by id.
///
/// Every component carries a name and the constraints attached to it through
/// the generic `set_*_constraints` calls.
#[derive(Debug, Clone)]
pub struct Component {
    id: ComponentId,
    name: String,
    constraints: Constraints,
    kind: ComponentKind,
}

impl Component {
    pub(crate) fn new(id: ComponentId, name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id,
            name: name.into(),
            constraints: Constraints::default(),
            kind,
        }
    }

    /// Component id.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attached numerical constraints and locked joints.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Kind-specific payload.
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Node payload, if this is a node.
    pub fn as_node(&self) -> Option<&Node> {
        match &self.kind {
            ComponentKind::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Edge payload, if this is an edge.
    pub fn as_edge(&self) -> Option<&Edge> {
        match &self.kind {
            ComponentKind::Edge(edge) => Some(edge),
            _ => None,
        }
    }

    /// Selector payload, if this is a subgraph.
    pub fn as_selector(&self) -> Option<&NodeSelector> {
        match &self.kind {
            ComponentKind::Selector(selector) => Some(selector),
            _ => None,
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut Constraints {
        &mut self.constraints
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ComponentKind {
        &mut self.kind
    }
}
