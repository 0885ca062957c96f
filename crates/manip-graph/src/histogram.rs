// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Leaf histograms over foliations.
//!
//! A foliation is a family of manifolds indexed by the value of some
//! constraints (the grasp pose for a fixed object placement, say). The
//! histogram counts how many observed configurations fell on each leaf so
//! samplers can favour leaves that have been visited least.
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use manip_math::Prng;
use nalgebra::DVector;
use tracing::trace;

use crate::constraint::{ConstraintSet, Constraints, SolverError};
use crate::ComponentId;

/// The constraints whose values index the leaves.
#[derive(Debug, Clone, Default)]
pub struct Foliation {
    constraints: Constraints,
}

impl Foliation {
    /// Wraps `constraints`.
    pub fn new(constraints: Constraints) -> Self {
        Self { constraints }
    }

    /// Constraints indexing the leaves.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Leaf parameter of `q`: numerical function values followed by the
    /// locked joint entries.
    pub fn leaf_of(&self, q: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
        let mut leaf = Vec::with_capacity(self.constraints.dimension());
        for c in &self.constraints.numerical {
            leaf.extend(c.value(q)?.iter());
        }
        for l in &self.constraints.locked {
            l.check_rank(q.len())?;
            leaf.push(q[l.rank()]);
        }
        Ok(DVector::from_vec(leaf))
    }
}

/// What a registered histogram tracks. A roadmap keeps at most one histogram
/// per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistogramKey {
    /// Foliation of a level-set edge.
    LevelSet(ComponentId),
    /// Full configuration constraint of an edge.
    EdgeStatistics(ComponentId),
}

/// One leaf seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafBin {
    /// Leaf parameter.
    pub leaf: DVector<f64>,
    /// Number of observations that fell on the leaf.
    pub count: usize,
    /// First configuration observed on the leaf.
    pub representative: DVector<f64>,
}

/// Observation counts per foliation leaf.
///
/// Observations may arrive from several sampling threads, so the bins sit
/// behind a mutex. The condition can be swapped while the histogram is shared
/// (the graph refreshes it when the node it mirrors changes).
#[derive(Debug)]
pub struct LeafHistogram {
    name: String,
    key: Option<HistogramKey>,
    foliation: Foliation,
    condition: RwLock<Option<ConstraintSet>>,
    tolerance: f64,
    bins: Mutex<Vec<LeafBin>>,
}

impl LeafHistogram {
    /// Histogram over `foliation`; leaves closer than `tolerance` (max-norm)
    /// share a bin.
    pub fn new(name: impl Into<String>, foliation: Foliation, tolerance: f64) -> Self {
        Self {
            name: name.into(),
            key: None,
            foliation,
            condition: RwLock::new(None),
            tolerance,
            bins: Mutex::new(Vec::new()),
        }
    }

    /// Only count configurations satisfying `condition`.
    pub fn with_condition(self, condition: ConstraintSet) -> Self {
        self.set_condition(Some(condition));
        self
    }

    /// Tags the histogram with what it tracks.
    pub fn with_key(mut self, key: HistogramKey) -> Self {
        self.key = Some(key);
        self
    }

    /// What the histogram tracks, if tagged.
    pub fn key(&self) -> Option<HistogramKey> {
        self.key
    }

    /// Replaces the condition. Counts already recorded are kept; see
    /// [`LeafHistogram::clear`].
    pub fn set_condition(&self, condition: Option<ConstraintSet>) {
        *self.condition.write().unwrap_or_else(PoisonError::into_inner) = condition;
    }

    /// Drops every bin.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Histogram name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The foliation.
    pub fn foliation(&self) -> &Foliation {
        &self.foliation
    }

    /// Records `q`. Returns whether it was counted (it may fail the
    /// condition).
    pub fn observe(&self, q: &DVector<f64>) -> Result<bool, SolverError> {
        {
            let condition = self.condition.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(condition) = condition.as_ref() {
                if !condition.is_satisfied(q)? {
                    return Ok(false);
                }
            }
        }
        let leaf = self.foliation.leaf_of(q)?;
        let mut bins = self.lock();
        if let Some(bin) = bins
            .iter_mut()
            .find(|bin| (&bin.leaf - &leaf).amax() <= self.tolerance)
        {
            bin.count += 1;
        } else {
            trace!(histogram = %self.name, leaves = bins.len() + 1, "new leaf");
            bins.push(LeafBin {
                leaf,
                count: 1,
                representative: q.clone(),
            });
        }
        Ok(true)
    }

    /// Snapshot of the bins, in discovery order.
    pub fn bins(&self) -> Vec<LeafBin> {
        self.lock().clone()
    }

    /// Number of counted observations.
    pub fn total(&self) -> usize {
        self.lock().iter().map(|bin| bin.count).sum()
    }

    /// Fraction of observations on the leaf containing `q` (zero when the
    /// leaf was never seen).
    #[allow(clippy::cast_precision_loss)]
    pub fn frequency(&self, q: &DVector<f64>) -> Result<f64, SolverError> {
        let leaf = self.foliation.leaf_of(q)?;
        let bins = self.lock();
        let total: usize = bins.iter().map(|bin| bin.count).sum();
        if total == 0 {
            return Ok(0.0);
        }
        let count = bins
            .iter()
            .find(|bin| (&bin.leaf - &leaf).amax() <= self.tolerance)
            .map_or(0, |bin| bin.count);
        Ok(count as f64 / total as f64)
    }

    /// Representative of the least visited leaf (earliest on ties).
    pub fn least_visited(&self) -> Option<DVector<f64>> {
        let bins = self.lock();
        let mut best: Option<&LeafBin> = None;
        for bin in bins.iter() {
            if best.is_none_or(|b| bin.count < b.count) {
                best = Some(bin);
            }
        }
        best.map(|bin| bin.representative.clone())
    }

    /// Draws a leaf representative with probability proportional to
    /// `1 / count`.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, prng: &mut Prng) -> Option<DVector<f64>> {
        let bins = self.lock();
        let total: f64 = bins.iter().map(|bin| 1.0 / bin.count as f64).sum();
        if bins.is_empty() || total <= 0.0 {
            return None;
        }
        let mut ticket = prng.next_f64() * total;
        for bin in bins.iter() {
            let w = 1.0 / bin.count as f64;
            if ticket < w {
                return Some(bin.representative.clone());
            }
            ticket -= w;
        }
        bins.last().map(|bin| bin.representative.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LeafBin>> {
        self.bins.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
