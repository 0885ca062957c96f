// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Planners and the graph-aware extension step.
use std::fmt;

use manip_math::Prng;
use nalgebra::DVector;
use tracing::{debug, trace, warn};

use crate::config::PlannerParams;
use crate::constraint::ConstraintSet;
use crate::edge::EdgeKind;
use crate::error::{GraphError, Result};
use crate::graph::ConstraintGraph;
use crate::ComponentId;

/// A path planner plugged into a session.
pub trait PathPlanner: fmt::Debug + Send {
    /// Planner kind, for error messages.
    fn name(&self) -> &str;

    /// The single-step extension capability, if the planner knows about
    /// constraint graphs.
    fn as_graph_aware(&mut self) -> Option<&mut dyn GraphExtend> {
        None
    }
}

/// One extension step that respects a constraint graph.
pub trait GraphExtend {
    /// Tries to move from `q_near` toward `q_rand` along one transition of
    /// `graph`. `None` means no transition made progress.
    fn extend(
        &mut self,
        graph: &ConstraintGraph,
        q_near: &DVector<f64>,
        q_rand: &DVector<f64>,
    ) -> Result<Option<ConstrainedPath>>;
}

/// A polyline produced by one extension step.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedPath {
    edge: ComponentId,
    start: DVector<f64>,
    points: Vec<DVector<f64>>,
}

impl ConstrainedPath {
    fn new(edge: ComponentId, start: DVector<f64>) -> Self {
        Self {
            edge,
            start,
            points: Vec::new(),
        }
    }

    /// The transition taken.
    pub fn edge(&self) -> ComponentId {
        self.edge
    }

    /// Where the step started.
    pub fn start(&self) -> &DVector<f64> {
        &self.start
    }

    /// Where the step ended.
    pub fn end(&self) -> &DVector<f64> {
        self.points.last().unwrap_or(&self.start)
    }

    /// Samples reached after the start, in order.
    pub fn points(&self) -> &[DVector<f64>] {
        &self.points
    }

    /// Sum of the Euclidean lengths of the pieces.
    pub fn length(&self) -> f64 {
        let mut previous = &self.start;
        let mut length = 0.0;
        for q in &self.points {
            length += (q - previous).norm();
            previous = q;
        }
        length
    }
}

/// Graph-aware planner: classify, pick an edge, project, interpolate.
#[derive(Debug, Clone)]
pub struct ManipulationPlanner {
    prng: Prng,
    params: PlannerParams,
}

impl ManipulationPlanner {
    /// Planner seeded from `params.seed`.
    pub fn new(params: PlannerParams) -> Self {
        Self {
            prng: Prng::from_seed_u64(params.seed),
            params,
        }
    }

    /// Projects `q_rand` onto what `segment` reaches from `from`.
    fn project_segment(
        &mut self,
        graph: &ConstraintGraph,
        segment: ComponentId,
        from: &DVector<f64>,
        q_rand: &DVector<f64>,
    ) -> Result<Option<DVector<f64>>> {
        let mut set = if let EdgeKind::LevelSet(level_set) = graph.edge(segment)?.kind() {
            let leaf = level_set
                .histogram()
                .and_then(|h| h.sample(&mut self.prng))
                .unwrap_or_else(|| from.clone());
            graph.level_set_constraint(segment, from, &leaf)?
        } else {
            let mut set = graph.config_constraint_for_edges(&[segment])?;
            set.offset_from_config(from)?;
            set
        };
        let mut q = q_rand.clone();
        if set.apply(&mut q)? {
            Ok(Some(q))
        } else {
            debug!(%segment, residual = ?set.residual_error(), "transition projection failed");
            Ok(None)
        }
    }

    /// Appends projected interpolation samples from `from` to `to`; stops at
    /// the first sample the path constraint rejects.
    #[allow(clippy::cast_precision_loss)]
    fn interpolate(
        &self,
        path_set: &mut ConstraintSet,
        from: &DVector<f64>,
        to: &DVector<f64>,
        path: &mut ConstrainedPath,
    ) -> Result<bool> {
        path_set.offset_from_config(from)?;
        let steps = self.params.interpolation_steps.max(1);
        for i in 1..=steps {
            let mut q = from.lerp(to, i as f64 / steps as f64);
            if !path_set.apply(&mut q)? {
                trace!(step = i, steps, "path truncated");
                return Ok(false);
            }
            path.points.push(q);
        }
        Ok(true)
    }
}

impl Default for ManipulationPlanner {
    fn default() -> Self {
        Self::new(PlannerParams::default())
    }
}

impl PathPlanner for ManipulationPlanner {
    fn name(&self) -> &str {
        "manipulation planner"
    }

    fn as_graph_aware(&mut self) -> Option<&mut dyn GraphExtend> {
        Some(self)
    }
}

impl GraphExtend for ManipulationPlanner {
    fn extend(
        &mut self,
        graph: &ConstraintGraph,
        q_near: &DVector<f64>,
        q_rand: &DVector<f64>,
    ) -> Result<Option<ConstrainedPath>> {
        let node = match graph.get_node(q_near) {
            Ok(node) => node,
            Err(GraphError::NoMatchingNode) => {
                warn!("extension skipped: q_near is in no node");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let Some(edge) = graph.choose_edge(node, &mut self.prng)? else {
            debug!(%node, "no outgoing edge to extend along");
            return Ok(None);
        };
        let segments = graph
            .edge(edge)?
            .waypoint_chain()
            .map_or_else(|| vec![edge], |chain| chain.segments().to_vec());

        let mut path = ConstrainedPath::new(edge, q_near.clone());
        for segment in segments {
            let from = path.end().clone();
            let Some(target) = self.project_segment(graph, segment, &from, q_rand)? else {
                break;
            };
            let mut path_set = graph.path_constraint(segment)?;
            if !self.interpolate(&mut path_set, &from, &target, &mut path)? {
                break;
            }
        }
        if path.points.is_empty() {
            warn!(%edge, "extension step made no progress");
            return Ok(None);
        }
        debug!(%edge, samples = path.points.len(), length = path.length(), "extension step");
        Ok(Some(path))
    }
}

/// Planner that only knows straight lines; it cannot extend along a graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLinePlanner;

impl PathPlanner for StraightLinePlanner {
    fn name(&self) -> &str {
        "straight-line planner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_manipulation_planner_is_graph_aware() {
        let mut manip = ManipulationPlanner::default();
        let mut straight = StraightLinePlanner;
        assert!(manip.as_graph_aware().is_some());
        assert!(straight.as_graph_aware().is_none());
    }

    #[test]
    fn path_length_sums_pieces() {
        let mut path = ConstrainedPath::new(ComponentId::from_raw(1), DVector::from_vec(vec![0.0, 0.0]));
        assert_eq!(path.end(), path.start());
        path.points.push(DVector::from_vec(vec![3.0, 4.0]));
        path.points.push(DVector::from_vec(vec![3.0, 5.0]));
        approx::assert_abs_diff_eq!(path.length(), 6.0, epsilon = 1e-12);
    }
}
