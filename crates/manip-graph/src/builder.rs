// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Name-based construction on top of the id-based session calls.
use rustc_hash::FxHashMap;

use crate::error::{GraphError, Result};
use crate::problem::ProblemSolver;
use crate::ComponentId;

/// Builds a graph by element name instead of id.
///
/// Creates the graph and one default subgraph `<name>_sg`; nodes and edges
/// are remembered by name so constraints can be attached by name later.
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    solver: &'a mut ProblemSolver,
    graph: ComponentId,
    subgraph: ComponentId,
    nodes: FxHashMap<String, ComponentId>,
    edges: FxHashMap<String, ComponentId>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates graph `name` in `solver` (replacing any previous graph).
    pub fn new(solver: &'a mut ProblemSolver, name: &str) -> Result<Self> {
        let graph = solver.create_graph(name)?;
        let subgraph = solver.create_sub_graph(&format!("{name}_sg"))?;
        Ok(Self {
            solver,
            graph,
            subgraph,
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
        })
    }

    /// Graph id.
    pub fn graph(&self) -> ComponentId {
        self.graph
    }

    /// Default subgraph id.
    pub fn subgraph(&self) -> ComponentId {
        self.subgraph
    }

    /// Creates nodes in the default subgraph, in order. Among equally
    /// constrained nodes, earlier ones win classification.
    pub fn create_nodes(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            let id = self.solver.create_node(self.subgraph, name)?;
            self.nodes.insert((*name).to_owned(), id);
        }
        Ok(())
    }

    /// Creates an edge between named nodes. Without `in_node_from`, paths
    /// stay in the source node when it was created after the target.
    pub fn create_edge(
        &mut self,
        from: &str,
        to: &str,
        name: &str,
        weight: u32,
        in_node_from: Option<bool>,
    ) -> Result<ComponentId> {
        let (from, to) = (self.node(from)?, self.node(to)?);
        let in_node_from = in_node_from.unwrap_or(from > to);
        let id = self.solver.create_edge(from, to, name, weight, in_node_from)?;
        self.edges.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Creates a waypoint edge and registers every chain member by name.
    pub fn create_waypoint_edge(
        &mut self,
        from: &str,
        to: &str,
        name: &str,
        n: usize,
        weight: u32,
        in_node_from: Option<bool>,
    ) -> Result<ComponentId> {
        let (from, to) = (self.node(from)?, self.node(to)?);
        let in_node_from = in_node_from.unwrap_or(from > to);
        let chain = self
            .solver
            .create_waypoint_edge(from, to, name, n, weight, in_node_from)?;
        for node in &chain.nodes {
            self.nodes.insert(node.name.clone(), node.id);
        }
        for edge in &chain.edges {
            self.edges.insert(edge.name.clone(), edge.id);
        }
        chain
            .edges
            .last()
            .map(|e| e.id)
            .ok_or_else(|| GraphError::InvalidArgument(format!("waypoint edge `{name}` is empty")))
    }

    /// Creates a level-set edge between named nodes.
    pub fn create_level_set_edge(
        &mut self,
        from: &str,
        to: &str,
        name: &str,
        weight: u32,
        in_node_from: Option<bool>,
    ) -> Result<ComponentId> {
        let (from, to) = (self.node(from)?, self.node(to)?);
        let in_node_from = in_node_from.unwrap_or(from > to);
        let id = self
            .solver
            .create_level_set_edge(from, to, name, weight, in_node_from)?;
        self.edges.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Attaches named constraints to the element called `element` (a node or
    /// edge name, or the graph name).
    pub fn set_constraints(&mut self, element: &str, numerical: &[&str], locked: &[&str]) -> Result<()> {
        let id = self.element(element)?;
        self.solver.set_numerical_constraints(id, numerical)?;
        self.solver.set_locked_dof_constraints(id, locked)
    }

    /// Attaches named path constraints to node `node`.
    pub fn set_path_constraints(&mut self, node: &str, numerical: &[&str]) -> Result<()> {
        let id = self.node(node)?;
        self.solver.set_numerical_constraints_for_path(id, numerical)
    }

    /// Id of the node called `name`.
    pub fn node(&self, name: &str) -> Result<ComponentId> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NotFound(format!("node `{name}`")))
    }

    /// Id of the edge called `name`.
    pub fn edge(&self, name: &str) -> Result<ComponentId> {
        self.edges
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NotFound(format!("edge `{name}`")))
    }

    fn element(&self, name: &str) -> Result<ComponentId> {
        if self.solver.graph()?.name() == name {
            return Ok(self.graph);
        }
        self.node(name).or_else(|_| self.edge(name))
    }
}
