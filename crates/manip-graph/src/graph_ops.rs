// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph construction and statistics calls on a [`ProblemSolver`].
//!
//! Every call resolves all of its ids and names before it mutates anything,
//! so a failing call leaves the graph as it was.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{GraphError, Result};
use crate::graph::ConstraintGraph;
use crate::histogram::{Foliation, HistogramKey, LeafHistogram};
use crate::problem::{no_graph, ProblemSolver};
use crate::waypoint::GraphElements;
use crate::ComponentId;

impl ProblemSolver {
    /// Creates the session's constraint graph, replacing any previous one.
    ///
    /// Ids handed out by the previous graph stop resolving.
    #[instrument(skip(self))]
    pub fn create_graph(&mut self, name: &str) -> Result<ComponentId> {
        let robot = self.robot.as_ref().ok_or_else(|| {
            GraphError::PreconditionViolation(
                "a composite robot must exist before the constraint graph".to_owned(),
            )
        })?;
        let graph = ConstraintGraph::new(name, robot, self.config.solver);
        let id = graph.id();
        if let Some(previous) = self.graph.replace(graph) {
            info!(previous = previous.name(), "constraint graph replaced");
        }
        Ok(id)
    }

    /// Adds a subgraph.
    #[instrument(skip(self))]
    pub fn create_sub_graph(&mut self, name: &str) -> Result<ComponentId> {
        Ok(self.graph_mut()?.create_node_selector(name))
    }

    /// Adds a node to a subgraph.
    #[instrument(skip(self))]
    pub fn create_node(&mut self, subgraph: ComponentId, name: &str) -> Result<ComponentId> {
        self.graph_mut()?.create_node(subgraph, name)
    }

    /// Adds a plain edge.
    #[instrument(skip(self))]
    pub fn create_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        name: &str,
        weight: u32,
        is_in_node_from: bool,
    ) -> Result<ComponentId> {
        self.graph_mut()?
            .create_edge(from, to, name, weight, is_in_node_from)
    }

    /// Adds a waypoint edge of `n` segments; see
    /// [`ConstraintGraph::create_waypoint_edge`].
    #[instrument(skip(self))]
    pub fn create_waypoint_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        name: &str,
        n: usize,
        weight: u32,
        is_in_node_from: bool,
    ) -> Result<GraphElements> {
        self.graph_mut()?
            .create_waypoint_edge(from, to, name, n, weight, is_in_node_from)
    }

    /// First segment and first waypoint node of a waypoint edge, renamed
    /// after their role.
    #[instrument(skip(self))]
    pub fn get_waypoint(&mut self, edge: ComponentId) -> Result<(ComponentId, ComponentId)> {
        self.graph_mut()?.get_waypoint(edge)
    }

    /// The full chain of a waypoint edge.
    pub fn waypoint_chain(&self, edge: ComponentId) -> Result<GraphElements> {
        self.graph()?.waypoint_chain(edge)
    }

    /// Adds a level-set edge.
    #[instrument(skip(self))]
    pub fn create_level_set_edge(
        &mut self,
        from: ComponentId,
        to: ComponentId,
        name: &str,
        weight: u32,
        is_in_node_from: bool,
    ) -> Result<ComponentId> {
        self.graph_mut()?
            .create_level_set_edge(from, to, name, weight, is_in_node_from)
    }

    /// Attaches foliation constraints to a level-set edge and registers its
    /// histogram with the roadmap.
    #[instrument(skip(self))]
    pub fn set_level_set_constraints(
        &mut self,
        edge: ComponentId,
        numerical: &[&str],
        locked: &[&str],
    ) -> Result<()> {
        let graph = self.graph.as_mut().ok_or_else(no_graph)?;
        graph.level_set(edge)?;
        let batch = self.constraints.resolve(numerical, locked)?;
        if self.roadmap.statistics().is_none() {
            return Err(no_statistics(self.roadmap.name()));
        }
        let histogram = graph.attach_foliation(edge, &batch, self.config.histogram.leaf_tolerance)?;
        let stats = self
            .roadmap
            .statistics_mut()
            .ok_or_else(|| no_statistics("roadmap"))?;
        stats.insert_histogram(histogram)?;
        self.refresh_statistics()
    }

    /// Sets whether paths along `edge` stay in its source node.
    #[instrument(skip(self))]
    pub fn set_is_in_node_from(&mut self, edge: ComponentId, value: bool) -> Result<()> {
        self.graph_mut()?.set_in_node_from(edge, value)?;
        self.refresh_statistics()
    }

    /// Attaches named numerical constraints to any component.
    #[instrument(skip(self))]
    pub fn set_numerical_constraints(&mut self, component: ComponentId, names: &[&str]) -> Result<()> {
        let graph = self.graph.as_mut().ok_or_else(no_graph)?;
        graph.component(component)?;
        let batch = self.constraints.resolve(names, &[] as &[&str])?;
        if batch.is_empty() {
            return Ok(());
        }
        graph.add_constraints(component, &batch)?;
        self.refresh_statistics()
    }

    /// Attaches named locked joints to any component.
    #[instrument(skip(self))]
    pub fn set_locked_dof_constraints(&mut self, component: ComponentId, names: &[&str]) -> Result<()> {
        let graph = self.graph.as_mut().ok_or_else(no_graph)?;
        graph.component(component)?;
        let batch = self.constraints.resolve(&[] as &[&str], names)?;
        if batch.is_empty() {
            return Ok(());
        }
        graph.add_constraints(component, &batch)?;
        self.refresh_statistics()
    }

    /// Attaches named numerical constraints to a node's path constraints.
    #[instrument(skip(self))]
    pub fn set_numerical_constraints_for_path(&mut self, node: ComponentId, names: &[&str]) -> Result<()> {
        let graph = self.graph.as_mut().ok_or_else(no_graph)?;
        graph.node(node)?;
        let batch = self.constraints.resolve_numerical(names)?;
        if batch.is_empty() {
            return Ok(());
        }
        graph.add_path_constraints(node, batch)
    }

    /// Registers with the roadmap a histogram over the full configuration
    /// constraint of `edge`.
    #[instrument(skip(self))]
    pub fn stat_on_constraint(&mut self, edge: ComponentId) -> Result<()> {
        let graph = self.graph.as_ref().ok_or_else(no_graph)?;
        graph.edge(edge)?;
        if self.roadmap.statistics().is_none() {
            return Err(no_statistics(self.roadmap.name()));
        }
        let histogram = edge_statistics(graph, edge, self.config.histogram.leaf_tolerance)?;
        let stats = self
            .roadmap
            .statistics_mut()
            .ok_or_else(|| no_statistics("roadmap"))?;
        stats.insert_histogram(histogram)?;
        Ok(())
    }

    /// Writes the graph as Graphviz DOT to `path`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn display(&self, path: impl AsRef<Path>) -> Result<()> {
        let graph = self.graph()?;
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        graph.write_dot(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// The graph as a Graphviz DOT string.
    pub fn graph_dot(&self) -> Result<String> {
        let mut out = Vec::new();
        self.graph()?.write_dot(&mut out)?;
        String::from_utf8(out).map_err(|e| GraphError::InvalidArgument(e.to_string()))
    }

    fn graph_mut(&mut self) -> Result<&mut ConstraintGraph> {
        self.graph.as_mut().ok_or_else(no_graph)
    }

    /// Brings the roadmap's histograms back in line with the graph after
    /// constraints or edge placement changed: statistics over edge
    /// constraints are rebuilt, and every histogram is recounted under its
    /// current condition.
    fn refresh_statistics(&mut self) -> Result<()> {
        self.recount_statistics()?;
        let tolerance = self.config.histogram.leaf_tolerance;
        let (Some(graph), Some(stats)) = (self.graph.as_ref(), self.roadmap.statistics_mut()) else {
            return Ok(());
        };
        let edges: Vec<ComponentId> = stats
            .histograms()
            .iter()
            .filter_map(|h| match h.key() {
                Some(HistogramKey::EdgeStatistics(edge)) => Some(edge),
                _ => None,
            })
            .collect();
        for edge in edges {
            // Edges of a replaced graph no longer resolve.
            if graph.edge(edge).is_ok() {
                stats.insert_histogram(edge_statistics(graph, edge, tolerance)?)?;
            }
        }
        Ok(())
    }
}

/// Histogram over the full configuration constraint of `edge`.
fn edge_statistics(graph: &ConstraintGraph, edge: ComponentId, tolerance: f64) -> Result<Arc<LeafHistogram>> {
    let name = graph.component(edge)?.name();
    let set = graph.config_constraint_for_edges(&[edge])?;
    let histogram = LeafHistogram::new(format!("stat({name})"), Foliation::new(set.constraints()), tolerance)
        .with_key(HistogramKey::EdgeStatistics(edge));
    Ok(Arc::new(histogram))
}

fn no_statistics(roadmap: &str) -> GraphError {
    GraphError::TypeMismatch {
        expected: "roadmap with foliation statistics",
        found: roadmap.to_owned(),
    }
}
