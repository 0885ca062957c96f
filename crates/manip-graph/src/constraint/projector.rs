// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Iterative projection onto the intersection of numerical constraints.
use nalgebra::{DMatrix, DVector};
use tracing::trace;

use super::{Constraints, LockedJoint, NumericalConstraint, SolverError};
use crate::config::SolverParams;

/// Step halvings tried per iteration before giving up.
const MAX_BACKTRACKS: usize = 8;
/// Singular values below this are treated as zero in the pseudo-inverse.
const PINV_EPSILON: f64 = 1e-10;

/// Damped Gauss–Newton projector.
///
/// Locked joints are written first and their columns are frozen; the
/// numerical constraints are then corrected with `Δq = -J⁺·e` and a
/// backtracking step until the error norm drops below the threshold or the
/// iteration budget runs out. The loop is bounded by `max_iterations ×
/// MAX_BACKTRACKS` evaluations.
///
/// The residual covers every constraint: the numerical error and the
/// deviation from each locked value. Two locked joints pinning the same
/// entry to different values therefore leave a residual and fail.
#[derive(Debug, Clone)]
pub struct ConfigProjector {
    constraints: Constraints,
    params: SolverParams,
    residual_error: f64,
}

impl ConfigProjector {
    /// Builds a projector over `constraints`.
    pub fn new(constraints: Constraints, params: SolverParams) -> Self {
        Self {
            constraints,
            params,
            residual_error: 0.0,
        }
    }

    /// Constraints being enforced.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Numerical constraints being enforced.
    pub fn numerical(&self) -> &[NumericalConstraint] {
        &self.constraints.numerical
    }

    /// Locked joints being enforced.
    pub fn locked(&self) -> &[LockedJoint] {
        &self.constraints.locked
    }

    /// Solver parameters.
    pub fn params(&self) -> SolverParams {
        self.params
    }

    /// Residual left by the last [`ConfigProjector::apply`]; see
    /// [`ConfigProjector::residual`].
    pub fn residual_error(&self) -> f64 {
        self.residual_error
    }

    /// Re-anchors parametric constraints on `q`.
    pub fn offset_from_config(&mut self, q: &DVector<f64>) -> Result<(), SolverError> {
        self.constraints.offset_from_config(q)
    }

    /// Projects `q` in place. Returns whether the final error is below the
    /// threshold; `q` holds the best configuration found either way.
    pub fn apply(&mut self, q: &mut DVector<f64>) -> Result<bool, SolverError> {
        for locked in &self.constraints.locked {
            locked.apply(q)?;
        }
        let mut error = self.error(q)?;
        let mut norm = error.norm();
        let mut iterations = 0;
        while norm >= self.params.error_threshold && iterations < self.params.max_iterations {
            iterations += 1;
            let jacobian = self.jacobian(q, &error)?;
            let step = jacobian
                .pseudo_inverse(PINV_EPSILON)
                .map_err(|e| SolverError::PseudoInverse(e.to_owned()))?
                * &error;

            let mut alpha = 1.0;
            let mut improved = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = &*q - &step * alpha;
                let candidate_error = self.error(&candidate)?;
                if candidate_error.norm() < norm {
                    improved = Some((candidate, candidate_error));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((candidate, candidate_error)) = improved else {
                trace!(iterations, norm, "projector stalled");
                break;
            };
            *q = candidate;
            error = candidate_error;
            norm = error.norm();
        }
        let residual = norm.hypot(self.locked_violation(q)?);
        self.residual_error = residual;
        trace!(iterations, residual, "projection finished");
        Ok(residual < self.params.error_threshold)
    }

    /// Euclidean norm of the numerical error stacked with every locked
    /// joint's deviation.
    pub fn residual(&self, q: &DVector<f64>) -> Result<f64, SolverError> {
        Ok(self.error(q)?.norm().hypot(self.locked_violation(q)?))
    }

    /// Whether `q` satisfies every constraint: its residual is below the
    /// threshold. Agrees with the verdict of [`ConfigProjector::apply`].
    pub fn is_satisfied(&self, q: &DVector<f64>) -> Result<bool, SolverError> {
        Ok(self.residual(q)? < self.params.error_threshold)
    }

    fn locked_violation(&self, q: &DVector<f64>) -> Result<f64, SolverError> {
        let mut sum = 0.0;
        for locked in &self.constraints.locked {
            sum += locked.violation(q)?.powi(2);
        }
        Ok(sum.sqrt())
    }

    /// Stacked errors of the numerical constraints.
    pub fn error(&self, q: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
        let rows: usize = self.constraints.numerical.iter().map(NumericalConstraint::dimension).sum();
        let mut stacked = DVector::zeros(rows);
        let mut offset = 0;
        for c in &self.constraints.numerical {
            let e = c.error(q)?;
            stacked.rows_mut(offset, e.len()).copy_from(&e);
            offset += e.len();
        }
        Ok(stacked)
    }

    fn jacobian(&self, q: &DVector<f64>, error: &DVector<f64>) -> Result<DMatrix<f64>, SolverError> {
        let mut stacked = DMatrix::zeros(error.len(), q.len());
        let mut offset = 0;
        for c in &self.constraints.numerical {
            let dim = c.dimension();
            let rows = error.rows(offset, dim).clone_owned();
            let jac = c.error_jacobian(q, &rows)?;
            stacked.view_mut((offset, 0), (dim, q.len())).copy_from(&jac);
            offset += dim;
        }
        for locked in &self.constraints.locked {
            stacked.column_mut(locked.rank()).fill(0.0);
        }
        Ok(stacked)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::constraint::{AffineFunction, ComparisonType, DifferentiableFunction, JointValue};

    fn params() -> SolverParams {
        SolverParams {
            max_iterations: 40,
            error_threshold: 1e-8,
        }
    }

    #[test]
    fn linear_constraint_converges_in_one_step() {
        // q0 + q1 = 1
        let f = AffineFunction::new(
            "sum",
            DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
            DVector::from_element(1, -1.0),
        );
        let mut constraints = Constraints::default();
        constraints
            .numerical
            .push(NumericalConstraint::new(Arc::new(f), ComparisonType::EqualToZero));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![2.0, 2.0]);
        assert!(projector.apply(&mut q).expect("apply"));
        approx::assert_abs_diff_eq!(q[0] + q[1], 1.0, epsilon = 1e-9);
        // minimum-norm correction keeps the coordinates symmetric
        approx::assert_abs_diff_eq!(q[0], q[1], epsilon = 1e-9);
    }

    #[test]
    fn locked_columns_are_not_moved_by_numerical_correction() {
        let f = AffineFunction::new(
            "sum",
            DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
            DVector::from_element(1, -1.0),
        );
        let mut constraints = Constraints::default();
        constraints
            .numerical
            .push(NumericalConstraint::new(Arc::new(f), ComparisonType::EqualToZero));
        constraints.locked.push(LockedJoint::new("lock0", "j0", 0, 0.25));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![5.0, 5.0]);
        assert!(projector.apply(&mut q).expect("apply"));
        approx::assert_abs_diff_eq!(q[0], 0.25, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(q[1], 0.75, epsilon = 1e-9);
    }

    #[test]
    fn satisfied_inequality_leaves_configuration_alone() {
        let f = JointValue::new("q0", 0, 2);
        let mut constraints = Constraints::default();
        constraints
            .numerical
            .push(NumericalConstraint::new(Arc::new(f), ComparisonType::Superior));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![0.4, -3.0]);
        assert!(projector.apply(&mut q).expect("apply"));
        assert_eq!(q.as_slice(), &[0.4, -3.0]);

        let mut q = DVector::from_vec(vec![-0.4, -3.0]);
        assert!(projector.apply(&mut q).expect("apply"));
        approx::assert_abs_diff_eq!(q[0], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn contradictory_constraints_report_failure_with_residual() {
        let mut constraints = Constraints::default();
        for (name, target) in [("at_zero", 0.0), ("at_one", -1.0)] {
            let f = AffineFunction::new(
                name,
                DMatrix::from_row_slice(1, 1, &[1.0]),
                DVector::from_element(1, target),
            );
            constraints
                .numerical
                .push(NumericalConstraint::new(Arc::new(f), ComparisonType::EqualToZero));
        }
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![3.0]);
        assert!(!projector.apply(&mut q).expect("apply"));
        assert!(projector.residual_error() > 0.5);
    }

    #[test]
    fn conflicting_locked_joints_fail_with_their_gap_as_residual() {
        let mut constraints = Constraints::default();
        constraints.locked.push(LockedJoint::new("at_half", "j0", 0, 0.5));
        constraints.locked.push(LockedJoint::new("at_third", "j0", 0, 0.3));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![0.0, 0.0]);
        assert!(!projector.apply(&mut q).expect("apply"));
        approx::assert_abs_diff_eq!(projector.residual_error(), 0.2, epsilon = 1e-12);
        assert!(!projector.is_satisfied(&q).expect("satisfied"));
    }

    #[derive(Debug)]
    struct ShortValue;

    impl DifferentiableFunction for ShortValue {
        fn name(&self) -> &str {
            "short"
        }
        fn input_size(&self) -> usize {
            2
        }
        fn output_size(&self) -> usize {
            2
        }
        fn value(&self, q: &DVector<f64>) -> DVector<f64> {
            DVector::from_element(1, q[0])
        }
    }

    #[test]
    fn misreported_output_size_is_an_error() {
        let mut constraints = Constraints::default();
        constraints
            .numerical
            .push(NumericalConstraint::new(Arc::new(ShortValue), ComparisonType::EqualToZero));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![1.0, 1.0]);
        let err = projector.apply(&mut q).unwrap_err();
        assert!(matches!(
            err,
            SolverError::OutputShape { ref name, expected: (2, 1), found: (1, 1) } if name == "short"
        ));
    }

    #[derive(Debug)]
    struct NarrowJacobian;

    impl DifferentiableFunction for NarrowJacobian {
        fn name(&self) -> &str {
            "narrow"
        }
        fn input_size(&self) -> usize {
            2
        }
        fn output_size(&self) -> usize {
            1
        }
        fn value(&self, q: &DVector<f64>) -> DVector<f64> {
            DVector::from_element(1, q[0] - 5.0)
        }
        fn jacobian(&self, _q: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_element(1, 1, 1.0)
        }
    }

    #[test]
    fn misshapen_jacobian_is_an_error() {
        let mut constraints = Constraints::default();
        constraints
            .numerical
            .push(NumericalConstraint::new(Arc::new(NarrowJacobian), ComparisonType::EqualToZero));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![1.0, 1.0]);
        let err = projector.apply(&mut q).unwrap_err();
        assert!(matches!(
            err,
            SolverError::OutputShape { expected: (1, 2), found: (1, 1), .. }
        ));
    }

    #[test]
    fn wrong_configuration_size_is_a_dimension_error() {
        let mut constraints = Constraints::default();
        constraints.numerical.push(NumericalConstraint::new(
            Arc::new(JointValue::new("q0", 0, 3)),
            ComparisonType::EqualToZero,
        ));
        let mut projector = ConfigProjector::new(constraints, params());
        let mut q = DVector::from_vec(vec![1.0]);
        let err = projector.apply(&mut q).unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch { expected: 3, found: 1, .. }));
    }
}
