// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Roadmaps store the configurations a planning session reaches.
//!
//! Only [`ManipulationRoadmap`] keeps foliation statistics; asking a roadmap
//! without that capability to record them is a type mismatch.
use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;
use tracing::debug;

use crate::constraint::SolverError;
use crate::histogram::LeafHistogram;

/// Capability of collecting per-leaf statistics over foliations.
pub trait FoliationStatistics {
    /// Adds a histogram; configurations already stored are replayed into it.
    /// A histogram whose key is already registered takes the old one's place.
    fn insert_histogram(&mut self, histogram: Arc<LeafHistogram>) -> Result<(), SolverError>;

    /// Histograms in insertion order.
    fn histograms(&self) -> &[Arc<LeafHistogram>];

    /// Empties every histogram and replays the stored configurations, after
    /// the conditions they filter on have changed.
    fn recount(&mut self) -> Result<(), SolverError>;
}

/// A store of reached configurations.
pub trait Roadmap: fmt::Debug + Send {
    /// Roadmap kind, for error messages.
    fn name(&self) -> &str;

    /// Stores `q` and feeds it to any statistics.
    fn add_configuration(&mut self, q: &DVector<f64>) -> Result<(), SolverError>;

    /// Stored configurations in insertion order.
    fn configurations(&self) -> &[DVector<f64>];

    /// Number of stored configurations.
    fn len(&self) -> usize {
        self.configurations().len()
    }

    /// Whether nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Statistics capability, if this roadmap has one.
    fn statistics_mut(&mut self) -> Option<&mut dyn FoliationStatistics> {
        None
    }

    /// Read-only statistics capability.
    fn statistics(&self) -> Option<&dyn FoliationStatistics> {
        None
    }
}

/// Roadmap keeping a histogram per registered foliation.
#[derive(Debug, Default)]
pub struct ManipulationRoadmap {
    nodes: Vec<DVector<f64>>,
    histograms: Vec<Arc<LeafHistogram>>,
}

impl ManipulationRoadmap {
    /// An empty roadmap.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FoliationStatistics for ManipulationRoadmap {
    fn insert_histogram(&mut self, histogram: Arc<LeafHistogram>) -> Result<(), SolverError> {
        for q in &self.nodes {
            histogram.observe(q)?;
        }
        let slot = histogram
            .key()
            .and_then(|key| self.histograms.iter().position(|h| h.key() == Some(key)));
        debug!(
            histogram = histogram.name(),
            replayed = self.nodes.len(),
            replaced = slot.is_some(),
            "histogram registered"
        );
        match slot {
            Some(index) => self.histograms[index] = histogram,
            None => self.histograms.push(histogram),
        }
        Ok(())
    }

    fn histograms(&self) -> &[Arc<LeafHistogram>] {
        &self.histograms
    }

    fn recount(&mut self) -> Result<(), SolverError> {
        for histogram in &self.histograms {
            histogram.clear();
            for q in &self.nodes {
                histogram.observe(q)?;
            }
        }
        Ok(())
    }
}

impl Roadmap for ManipulationRoadmap {
    fn name(&self) -> &str {
        "manipulation roadmap"
    }

    fn add_configuration(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        for histogram in &self.histograms {
            histogram.observe(q)?;
        }
        self.nodes.push(q.clone());
        Ok(())
    }

    fn configurations(&self) -> &[DVector<f64>] {
        &self.nodes
    }

    fn statistics_mut(&mut self) -> Option<&mut dyn FoliationStatistics> {
        Some(self)
    }

    fn statistics(&self) -> Option<&dyn FoliationStatistics> {
        Some(self)
    }
}

/// Plain configuration list with no statistics.
#[derive(Debug, Default)]
pub struct BasicRoadmap {
    nodes: Vec<DVector<f64>>,
}

impl BasicRoadmap {
    /// An empty roadmap.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Roadmap for BasicRoadmap {
    fn name(&self) -> &str {
        "basic roadmap"
    }

    fn add_configuration(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        self.nodes.push(q.clone());
        Ok(())
    }

    fn configurations(&self) -> &[DVector<f64>] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{ComparisonType, Constraints, JointValue, NumericalConstraint};
    use crate::histogram::{Foliation, HistogramKey};
    use crate::ComponentId;

    fn histogram() -> Arc<LeafHistogram> {
        let foliation = Foliation::new(Constraints {
            numerical: vec![NumericalConstraint::new(
                Arc::new(JointValue::new("x", 0, 1)),
                ComparisonType::Equality,
            )],
            locked: Vec::new(),
        });
        Arc::new(LeafHistogram::new("h", foliation, 1e-3))
    }

    #[test]
    fn inserted_histograms_see_past_and_future_nodes() {
        let mut roadmap = ManipulationRoadmap::new();
        roadmap.add_configuration(&DVector::from_vec(vec![0.0])).expect("add");
        let h = histogram();
        roadmap
            .statistics_mut()
            .expect("statistics")
            .insert_histogram(Arc::clone(&h))
            .expect("insert");
        roadmap.add_configuration(&DVector::from_vec(vec![1.0])).expect("add");
        assert_eq!(h.total(), 2);
        assert_eq!(roadmap.len(), 2);
        assert_eq!(roadmap.statistics().expect("statistics").histograms().len(), 1);
    }

    #[test]
    fn histogram_with_a_registered_key_replaces_the_old_one() {
        let mut roadmap = ManipulationRoadmap::new();
        roadmap.add_configuration(&DVector::from_vec(vec![0.0])).expect("add");
        let edge = ComponentId::from_raw(7);
        let first = Arc::new(
            LeafHistogram::new("first", histogram().foliation().clone(), 1e-3)
                .with_key(HistogramKey::LevelSet(edge)),
        );
        let second = Arc::new(
            LeafHistogram::new("second", histogram().foliation().clone(), 1e-3)
                .with_key(HistogramKey::LevelSet(edge)),
        );
        let stats = roadmap.statistics_mut().expect("statistics");
        stats.insert_histogram(Arc::clone(&first)).expect("insert");
        stats.insert_histogram(histogram()).expect("insert");
        stats.insert_histogram(Arc::clone(&second)).expect("insert");

        let names: Vec<_> = stats.histograms().iter().map(|h| h.name().to_owned()).collect();
        assert_eq!(names, ["second", "h"]);
        roadmap.add_configuration(&DVector::from_vec(vec![1.0])).expect("add");
        assert_eq!(first.total(), 1, "replaced histogram no longer counts");
        assert_eq!(second.total(), 2);
    }

    #[test]
    fn recount_rebuilds_bins_from_stored_configurations() {
        let mut roadmap = ManipulationRoadmap::new();
        let h = histogram();
        roadmap
            .statistics_mut()
            .expect("statistics")
            .insert_histogram(Arc::clone(&h))
            .expect("insert");
        for x in [0.0, 1.0, 1.0] {
            roadmap.add_configuration(&DVector::from_vec(vec![x])).expect("add");
        }
        h.observe(&DVector::from_vec(vec![5.0])).expect("stray observation");
        roadmap.statistics_mut().expect("statistics").recount().expect("recount");
        assert_eq!(h.total(), 3);
        assert_eq!(h.bins().len(), 2);
    }

    #[test]
    fn basic_roadmap_has_no_statistics() {
        let mut roadmap = BasicRoadmap::new();
        assert!(roadmap.statistics_mut().is_none());
        assert!(roadmap.is_empty());
    }
}
