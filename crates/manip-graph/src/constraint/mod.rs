// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Numerical constraints and locked joints, the building blocks every graph
//! component accumulates, plus the projector that enforces them.
use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod function;
mod projector;
mod set;

pub use function::{
    finite_difference_jacobian, AffineFunction, DifferentiableFunction, JointValue,
    RelativeTransformation,
};
pub use projector::ConfigProjector;
pub use set::ConstraintSet;

/// Numerical failures raised while evaluating or projecting constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// A function was evaluated on a configuration of the wrong size.
    #[error("constraint `{name}` expects {expected} configuration entries, got {found}")]
    DimensionMismatch {
        /// Function name.
        name: String,
        /// Expected input size.
        expected: usize,
        /// Supplied configuration size.
        found: usize,
    },
    /// A locked joint points past the end of the configuration.
    #[error("locked joint `{name}` has rank {rank} outside a configuration of size {size}")]
    RankOutOfRange {
        /// Locked joint name.
        name: String,
        /// Configuration rank of the joint.
        rank: usize,
        /// Configuration size.
        size: usize,
    },
    /// A function returned a value or Jacobian whose shape disagrees with the
    /// sizes it reports. Shapes are `(rows, columns)`; values are columns.
    #[error("constraint `{name}` produced a {}x{} result, expected {}x{}", .found.0, .found.1, .expected.0, .expected.1)]
    OutputShape {
        /// Function name.
        name: String,
        /// Shape implied by `output_size` and `input_size`.
        expected: (usize, usize),
        /// Shape actually returned.
        found: (usize, usize),
    },
    /// A function returned NaN or infinity.
    #[error("constraint `{0}` evaluated to a non-finite value")]
    NonFinite(String),
    /// The Jacobian pseudo-inverse could not be computed.
    #[error("pseudo-inverse failed: {0}")]
    PseudoInverse(String),
}

/// How a function value is compared with its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComparisonType {
    /// `f(q) = 0`; offsets are ignored.
    EqualToZero,
    /// `f(q) = rhs`, where `rhs` is taken from an offset configuration.
    #[default]
    Equality,
    /// `f(q) >= rhs` component-wise.
    Superior,
    /// `f(q) <= rhs` component-wise.
    Inferior,
}

/// A differentiable function paired with a comparison and right-hand side.
///
/// Cloning is cheap (the function is shared); the right-hand side is owned so
/// a constraint set can re-anchor its copy without touching the graph.
#[derive(Clone)]
pub struct NumericalConstraint {
    function: Arc<dyn DifferentiableFunction>,
    comparison: ComparisonType,
    rhs: DVector<f64>,
}

impl fmt::Debug for NumericalConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericalConstraint")
            .field("function", &self.function.name())
            .field("comparison", &self.comparison)
            .field("rhs", &self.rhs.as_slice())
            .finish()
    }
}

impl NumericalConstraint {
    /// Wraps a function with a zero right-hand side.
    pub fn new(function: Arc<dyn DifferentiableFunction>, comparison: ComparisonType) -> Self {
        let rhs = DVector::zeros(function.output_size());
        Self {
            function,
            comparison,
            rhs,
        }
    }

    /// Name of the underlying function.
    pub fn name(&self) -> &str {
        self.function.name()
    }

    /// The underlying function.
    pub fn function(&self) -> &Arc<dyn DifferentiableFunction> {
        &self.function
    }

    /// Comparison type.
    pub fn comparison(&self) -> ComparisonType {
        self.comparison
    }

    /// Current right-hand side.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Number of scalar equations (or inequalities).
    pub fn dimension(&self) -> usize {
        self.function.output_size()
    }

    /// Re-anchors an `Equality` constraint on `q`: `rhs = f(q)`.
    pub fn offset_from_config(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        if self.comparison == ComparisonType::Equality {
            self.rhs = self.value(q)?;
        }
        Ok(())
    }

    /// Function value after size and finiteness checks.
    pub fn value(&self, q: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
        self.check_input(q)?;
        let value = self.function.value(q);
        if value.len() != self.dimension() {
            return Err(self.shape_error((self.dimension(), 1), (value.len(), 1)));
        }
        if value.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite(self.name().to_owned()));
        }
        Ok(value)
    }

    /// Signed violation; zero on satisfied inequality rows.
    pub fn error(&self, q: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
        let value = self.value(q)?;
        Ok(match self.comparison {
            ComparisonType::EqualToZero => value,
            ComparisonType::Equality => value - &self.rhs,
            ComparisonType::Superior => (value - &self.rhs).map(|v| v.min(0.0)),
            ComparisonType::Inferior => (value - &self.rhs).map(|v| v.max(0.0)),
        })
    }

    /// Jacobian of [`NumericalConstraint::error`]: rows of satisfied
    /// inequalities are zeroed.
    pub fn error_jacobian(
        &self,
        q: &DVector<f64>,
        error: &DVector<f64>,
    ) -> Result<DMatrix<f64>, SolverError> {
        self.check_input(q)?;
        let mut jac = self.function.jacobian(q);
        let expected = (self.dimension(), q.len());
        if jac.shape() != expected {
            return Err(self.shape_error(expected, jac.shape()));
        }
        if error.len() != self.dimension() {
            return Err(self.shape_error((self.dimension(), 1), (error.len(), 1)));
        }
        if matches!(
            self.comparison,
            ComparisonType::Superior | ComparisonType::Inferior
        ) {
            for (row, e) in error.iter().enumerate() {
                if e.abs() < f64::MIN_POSITIVE {
                    jac.row_mut(row).fill(0.0);
                }
            }
        }
        Ok(jac)
    }

    fn shape_error(&self, expected: (usize, usize), found: (usize, usize)) -> SolverError {
        SolverError::OutputShape {
            name: self.name().to_owned(),
            expected,
            found,
        }
    }

    fn check_input(&self, q: &DVector<f64>) -> Result<(), SolverError> {
        if q.len() != self.function.input_size() {
            return Err(SolverError::DimensionMismatch {
                name: self.name().to_owned(),
                expected: self.function.input_size(),
                found: q.len(),
            });
        }
        Ok(())
    }
}

/// A degree of freedom pinned to a value.
///
/// Parametric locked joints take their value from the offset configuration
/// instead of the registered one.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedJoint {
    name: String,
    joint: String,
    rank: usize,
    value: f64,
    parametric: bool,
}

impl LockedJoint {
    /// Locks configuration entry `rank` (belonging to `joint`) at `value`.
    pub fn new(name: impl Into<String>, joint: impl Into<String>, rank: usize, value: f64) -> Self {
        Self {
            name: name.into(),
            joint: joint.into(),
            rank,
            value,
            parametric: false,
        }
    }

    /// Constraint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the locked joint.
    pub fn joint(&self) -> &str {
        &self.joint
    }

    /// Configuration rank.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Locked value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether the value follows the offset configuration.
    pub fn is_parametric(&self) -> bool {
        self.parametric
    }

    /// Marks the joint parametric (or not).
    pub fn set_parametric(&mut self, parametric: bool) {
        self.parametric = parametric;
    }

    /// Copies `q[rank]` into the locked value when parametric.
    pub fn offset_from_config(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        self.check_rank(q.len())?;
        if self.parametric {
            self.value = q[self.rank];
        }
        Ok(())
    }

    /// Writes the locked value into `q`.
    pub fn apply(&self, q: &mut DVector<f64>) -> Result<(), SolverError> {
        self.check_rank(q.len())?;
        q[self.rank] = self.value;
        Ok(())
    }

    /// Absolute deviation of `q` from the locked value.
    pub fn violation(&self, q: &DVector<f64>) -> Result<f64, SolverError> {
        self.check_rank(q.len())?;
        Ok((q[self.rank] - self.value).abs())
    }

    pub(crate) fn check_rank(&self, size: usize) -> Result<(), SolverError> {
        if self.rank >= size {
            return Err(SolverError::RankOutOfRange {
                name: self.name.clone(),
                rank: self.rank,
                size,
            });
        }
        Ok(())
    }
}

/// Ordered numerical constraints and locked joints attached to something:
/// a graph component, a foliation, or an ephemeral constraint set.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Numerical constraints, in attachment order.
    pub numerical: Vec<NumericalConstraint>,
    /// Locked joints, in attachment order.
    pub locked: Vec<LockedJoint>,
}

impl Constraints {
    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.numerical.is_empty() && self.locked.is_empty()
    }

    /// Total number of constrained scalar quantities.
    pub fn dimension(&self) -> usize {
        self.numerical
            .iter()
            .map(NumericalConstraint::dimension)
            .sum::<usize>()
            + self.locked.len()
    }

    /// Appends copies of everything in `other`.
    pub fn extend_from(&mut self, other: &Self) {
        self.numerical.extend(other.numerical.iter().cloned());
        self.locked.extend(other.locked.iter().cloned());
    }

    /// Re-anchors every parametric member on `q`.
    pub fn offset_from_config(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        for c in &mut self.numerical {
            c.offset_from_config(q)?;
        }
        for l in &mut self.locked {
            l.offset_from_config(q)?;
        }
        Ok(())
    }
}
