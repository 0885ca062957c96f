// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Level-set edge data.
use std::sync::Arc;

use tracing::{debug, trace};

use crate::constraint::{ConstraintSet, Constraints};
use crate::edge::{Edge, EdgeKind};
use crate::error::{GraphError, Result};
use crate::graph::{mismatch, ConstraintGraph};
use crate::histogram::{Foliation, HistogramKey, LeafHistogram};
use crate::ComponentId;

/// Foliation constraints of a level-set edge and the histogram built over
/// them.
///
/// The histogram is rebuilt each time foliation constraints are attached, so
/// it always covers the full foliation. Its condition follows the node the
/// edge lives in; the graph refreshes it whenever that node's membership
/// constraints may have changed.
#[derive(Debug, Clone, Default)]
pub struct LevelSet {
    foliation: Constraints,
    histogram: Option<Arc<LeafHistogram>>,
}

impl LevelSet {
    /// Foliation constraints attached so far.
    pub fn foliation(&self) -> &Constraints {
        &self.foliation
    }

    /// Current histogram, once foliation constraints are set.
    pub fn histogram(&self) -> Option<&Arc<LeafHistogram>> {
        self.histogram.as_ref()
    }

    /// Appends `constraints` to the foliation and installs a fresh histogram
    /// counting configurations that satisfy `condition`.
    pub(crate) fn attach_foliation(
        &mut self,
        edge: ComponentId,
        name: &str,
        constraints: &Constraints,
        tolerance: f64,
        condition: Option<ConstraintSet>,
    ) -> Arc<LeafHistogram> {
        self.foliation.extend_from(constraints);
        let mut histogram = LeafHistogram::new(name, Foliation::new(self.foliation.clone()), tolerance)
            .with_key(HistogramKey::LevelSet(edge));
        if let Some(condition) = condition {
            histogram = histogram.with_condition(condition);
        }
        let histogram = Arc::new(histogram);
        self.histogram = Some(Arc::clone(&histogram));
        histogram
    }
}

impl ConstraintGraph {
    /// Resolves a level-set edge.
    pub fn level_set(&self, edge: ComponentId) -> Result<&LevelSet> {
        let component = self.component(edge)?;
        component
            .as_edge()
            .and_then(Edge::level_set)
            .ok_or_else(|| mismatch("level-set edge", component))
    }

    /// Appends foliation constraints to a level-set edge and rebuilds its
    /// histogram. The histogram only counts configurations lying in the node
    /// the edge lives in.
    pub(crate) fn attach_foliation(
        &mut self,
        edge: ComponentId,
        constraints: &Constraints,
        tolerance: f64,
    ) -> Result<Arc<LeafHistogram>> {
        self.level_set(edge)?;
        let condition = self.node_constraint(self.edge(edge)?.node())?;
        let name = self.component(edge)?.name().to_owned();
        match self.edge_mut(edge)?.kind_mut() {
            EdgeKind::LevelSet(level_set) => {
                let histogram = level_set.attach_foliation(edge, &name, constraints, tolerance, Some(condition));
                debug!(edge = %name, dimension = constraints.dimension(), "foliation attached");
                Ok(histogram)
            }
            _ => Err(GraphError::TypeMismatch {
                expected: "level-set edge",
                found: name,
            }),
        }
    }

    /// Re-derives the condition of every level-set histogram from the current
    /// membership constraints of the node its edge lives in.
    pub(crate) fn refresh_histogram_conditions(&self) -> Result<()> {
        for component in self.components() {
            let Some(edge) = component.as_edge() else {
                continue;
            };
            let Some(histogram) = edge.level_set().and_then(LevelSet::histogram) else {
                continue;
            };
            histogram.set_condition(Some(self.node_constraint(edge.node())?));
            trace!(edge = component.name(), "histogram condition refreshed");
        }
        Ok(())
    }
}
