// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The constraint graph: an id-indexed arena of typed components.
use manip_math::Prng;
use tracing::{debug, info};

use crate::component::{Component, ComponentKind};
use crate::config::SolverParams;
use crate::constraint::{Constraints, NumericalConstraint};
use crate::edge::{Edge, EdgeKind};
use crate::error::{GraphError, Result};
use crate::ident::{ComponentId, IdRegistry};
use crate::level_set::LevelSet;
use crate::node::{weighted_choice, Node};
use crate::robot::Device;
use crate::selector::NodeSelector;

/// Modes and transitions laid over a robot's configuration space.
///
/// The graph root, subgraphs, nodes and edges all live in one
/// [`IdRegistry`]; structural links between them are ids, never references.
/// Components are only ever added.
#[derive(Debug)]
pub struct ConstraintGraph {
    root: ComponentId,
    robot: String,
    config_size: usize,
    params: SolverParams,
    selectors: Vec<ComponentId>,
    components: IdRegistry<Component>,
}

impl ConstraintGraph {
    /// Creates an empty graph for `robot`, projecting with `params`.
    pub fn new(name: &str, robot: &Device, params: SolverParams) -> Self {
        let mut components = IdRegistry::default();
        let root = components.register(|id| Component::new(id, name, ComponentKind::Graph));
        info!(graph = name, id = %root, robot = robot.name(), "constraint graph created");
        Self {
            root,
            robot: robot.name().to_owned(),
            config_size: robot.config_size(),
            params,
            selectors: Vec::new(),
            components,
        }
    }

    /// Id of the graph root component.
    pub fn id(&self) -> ComponentId {
        self.root
    }

    /// Graph name.
    pub fn name(&self) -> &str {
        self.components
            .resolve(self.root)
            .map_or("", Component::name)
    }

    /// Name of the robot the graph was built for.
    pub fn robot_name(&self) -> &str {
        &self.robot
    }

    /// Configuration size of that robot.
    pub fn config_size(&self) -> usize {
        self.config_size
    }

    /// Projector parameters copied into every constraint set.
    pub fn params(&self) -> SolverParams {
        self.params
    }

    pub(crate) fn set_params(&mut self, params: SolverParams) -> Result<()> {
        self.params = params;
        self.refresh_histogram_conditions()
    }

    /// Subgraphs in creation order.
    pub fn selectors(&self) -> &[ComponentId] {
        &self.selectors
    }

    /// Every component, in creation order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().map(|(_, c)| c)
    }

    /// Number of components, the root included.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false: the root is a component.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Constraints attached to the graph root.
    pub fn constraints(&self) -> &Constraints {
        self.components
            .resolve(self.root)
            .map_or(&EMPTY, Component::constraints)
    }

    /// Adds a subgraph.
    pub fn create_node_selector(&mut self, name: &str) -> ComponentId {
        let id = self.components.register(|id| {
            Component::new(id, name, ComponentKind::Selector(NodeSelector::default()))
        });
        self.selectors.push(id);
        debug!(subgraph = name, %id, "subgraph created");
        id
    }

    /// Adds a node to `selector`.
    pub fn create_node(&mut self, selector: ComponentId, name: &str) -> Result<ComponentId> {
        self.selector(selector)?;
        let id = self
            .components
            .register(|id| Component::new(id, name, ComponentKind::Node(Node::in_selector(selector))));
        if let ComponentKind::Selector(s) = self.component_mut(selector)?.kind_mut() {
            s.push_node(id);
        }
        debug!(node = name, %id, %selector, "node created");
        Ok(id)
    }

    /// Adds a plain edge from `from` to `to`.
    pub fn create_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        name: &str,
        weight: u32,
        in_node_from: bool,
    ) -> Result<ComponentId> {
        self.insert_edge(from, to, name, Edge::new(from, to, weight, in_node_from, EdgeKind::Plain))
    }

    /// Adds a level-set edge from `from` to `to`; its foliation is empty
    /// until constraints are attached.
    pub fn create_level_set_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        name: &str,
        weight: u32,
        in_node_from: bool,
    ) -> Result<ComponentId> {
        let kind = EdgeKind::LevelSet(LevelSet::default());
        self.insert_edge(from, to, name, Edge::new(from, to, weight, in_node_from, kind))
    }

    /// Registers `edge` and appends it to the source node's outgoing list.
    pub(crate) fn insert_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        name: &str,
        edge: Edge,
    ) -> Result<ComponentId> {
        self.node(from)?;
        self.node(to)?;
        let id = self
            .components
            .register(|id| Component::new(id, name, ComponentKind::Edge(edge)));
        self.node_mut(from)?.push_out_edge(id);
        debug!(edge = name, %id, %from, %to, "edge created");
        Ok(id)
    }

    /// Registers a component that no node or selector links to (waypoint
    /// chain members).
    pub(crate) fn register_detached(&mut self, name: &str, kind: ComponentKind) -> ComponentId {
        self.components.register(|id| Component::new(id, name, kind))
    }

    /// Resolves any component.
    pub fn component(&self, id: ComponentId) -> Result<&Component> {
        self.components.resolve(id).ok_or_else(|| self.not_found(id))
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        if !self.components.contains(id) {
            return Err(self.not_found(id));
        }
        self.components
            .resolve_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))
    }

    /// Resolves a node.
    pub fn node(&self, id: ComponentId) -> Result<&Node> {
        let component = self.component(id)?;
        component.as_node().ok_or_else(|| mismatch("node", component))
    }

    pub(crate) fn node_mut(&mut self, id: ComponentId) -> Result<&mut Node> {
        let component = self.component_mut(id)?;
        let found = describe(component);
        match component.kind_mut() {
            ComponentKind::Node(node) => Ok(node),
            _ => Err(GraphError::TypeMismatch {
                expected: "node",
                found,
            }),
        }
    }

    /// Resolves an edge of any variant.
    pub fn edge(&self, id: ComponentId) -> Result<&Edge> {
        let component = self.component(id)?;
        component.as_edge().ok_or_else(|| mismatch("edge", component))
    }

    pub(crate) fn edge_mut(&mut self, id: ComponentId) -> Result<&mut Edge> {
        let component = self.component_mut(id)?;
        let found = describe(component);
        match component.kind_mut() {
            ComponentKind::Edge(edge) => Ok(edge),
            _ => Err(GraphError::TypeMismatch {
                expected: "edge",
                found,
            }),
        }
    }

    /// Resolves a subgraph.
    pub fn selector(&self, id: ComponentId) -> Result<&NodeSelector> {
        let component = self.component(id)?;
        component
            .as_selector()
            .ok_or_else(|| mismatch("subgraph", component))
    }

    /// Renames a component.
    pub fn set_name(&mut self, id: ComponentId, name: &str) -> Result<()> {
        self.component_mut(id)?.set_name(name);
        Ok(())
    }

    /// Appends constraints to any component.
    pub fn add_constraints(&mut self, id: ComponentId, constraints: &Constraints) -> Result<()> {
        let component = self.component_mut(id)?;
        component.constraints_mut().extend_from(constraints);
        debug!(
            component = component.name(),
            %id,
            numerical = constraints.numerical.len(),
            locked = constraints.locked.len(),
            "constraints attached"
        );
        self.refresh_histogram_conditions()
    }

    /// Appends path-only constraints to a node.
    pub fn add_path_constraints(
        &mut self,
        node: ComponentId,
        constraints: Vec<NumericalConstraint>,
    ) -> Result<()> {
        let count = constraints.len();
        self.node_mut(node)?.extend_path_constraints(constraints);
        debug!(%node, count, "path constraints attached");
        Ok(())
    }

    /// Sets whether paths along `edge` stay in its source node.
    pub fn set_in_node_from(&mut self, edge: ComponentId, value: bool) -> Result<()> {
        self.edge_mut(edge)?.set_in_node_from(value);
        self.refresh_histogram_conditions()
    }

    /// Outgoing edges of `node` with their weights.
    pub fn outgoing(&self, node: ComponentId) -> Result<Vec<(ComponentId, u32)>> {
        self.node(node)?
            .out_edges()
            .iter()
            .map(|&e| Ok((e, self.edge(e)?.weight())))
            .collect()
    }

    /// Picks an outgoing edge of `node` at random, proportionally to weight.
    pub fn choose_edge(&self, node: ComponentId, prng: &mut Prng) -> Result<Option<ComponentId>> {
        Ok(weighted_choice(&self.outgoing(node)?, prng))
    }

    fn not_found(&self, id: ComponentId) -> GraphError {
        GraphError::NotFound(format!("no component with id {id} in graph `{}`", self.name()))
    }
}

static EMPTY: Constraints = Constraints {
    numerical: Vec::new(),
    locked: Vec::new(),
};

pub(crate) fn describe(component: &Component) -> String {
    format!(
        "{} `{}` ({})",
        component.kind().label(),
        component.name(),
        component.id()
    )
}

pub(crate) fn mismatch(expected: &'static str, component: &Component) -> GraphError {
    GraphError::TypeMismatch {
        expected,
        found: describe(component),
    }
}
