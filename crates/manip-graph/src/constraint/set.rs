// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ephemeral constraint sets built from graph components.
use nalgebra::DVector;

use super::{ConfigProjector, Constraints, SolverError};
use crate::config::SolverParams;

/// The constraints of one or more graph components, ready to project.
///
/// Built on demand and never stored in the graph, so re-anchoring with
/// [`ConstraintSet::offset_from_config`] only affects this copy. A set with
/// nothing in it has no projector: every configuration satisfies it and no
/// residual error is reported.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    name: String,
    projector: Option<ConfigProjector>,
}

impl ConstraintSet {
    /// Builds a set; a projector is created when `constraints` is non-empty.
    pub fn new(name: impl Into<String>, constraints: Constraints, params: SolverParams) -> Self {
        let projector = (!constraints.is_empty()).then(|| ConfigProjector::new(constraints, params));
        Self {
            name: name.into(),
            projector,
        }
    }

    /// Human-readable name (`"node_a, node_b"` style).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The projector, when there is anything to project onto.
    pub fn config_projector(&self) -> Option<&ConfigProjector> {
        self.projector.as_ref()
    }

    /// Residual error of the last projection, if there is a projector.
    pub fn residual_error(&self) -> Option<f64> {
        self.projector.as_ref().map(ConfigProjector::residual_error)
    }

    /// Constraints in the set (empty when there is no projector).
    pub fn constraints(&self) -> Constraints {
        self.projector
            .as_ref()
            .map(|p| p.constraints().clone())
            .unwrap_or_default()
    }

    /// Re-anchors parametric constraints on `q`.
    pub fn offset_from_config(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        match &mut self.projector {
            Some(projector) => projector.offset_from_config(q),
            None => Ok(()),
        }
    }

    /// Projects `q` in place; see [`ConfigProjector::apply`].
    pub fn apply(&mut self, q: &mut DVector<f64>) -> Result<bool, SolverError> {
        match &mut self.projector {
            Some(projector) => projector.apply(q),
            None => Ok(true),
        }
    }

    /// Whether `q` satisfies the set within the threshold.
    pub fn is_satisfied(&self, q: &DVector<f64>) -> Result<bool, SolverError> {
        match &self.projector {
            Some(projector) => projector.is_satisfied(q),
            None => Ok(true),
        }
    }
}
