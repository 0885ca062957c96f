// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Differentiable functions of the configuration.
use std::fmt;
use std::sync::Arc;

use manip_math::Pose;
use nalgebra::{DMatrix, DVector};

use crate::robot::Device;

/// Step used by [`finite_difference_jacobian`].
const FD_STEP: f64 = 1e-7;

/// A vector-valued, differentiable function of a configuration.
///
/// Implementations may assume `q.len() == self.input_size()`; callers
/// ([`crate::NumericalConstraint`]) check the size before evaluating.
pub trait DifferentiableFunction: fmt::Debug + Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;
    /// Configuration size the function expects.
    fn input_size(&self) -> usize;
    /// Number of output components.
    fn output_size(&self) -> usize;
    /// Function value at `q`.
    fn value(&self, q: &DVector<f64>) -> DVector<f64>;
    /// Jacobian at `q` (`output_size × input_size`). Central differences by
    /// default.
    fn jacobian(&self, q: &DVector<f64>) -> DMatrix<f64> {
        finite_difference_jacobian(self, q)
    }
}

/// Central-difference Jacobian of `f` at `q`.
///
/// When `f` returns values whose length differs from `output_size`, the
/// result takes that length as its row count so the mismatch shows up in a
/// shape check instead of a panic.
pub fn finite_difference_jacobian<F>(f: &F, q: &DVector<f64>) -> DMatrix<f64>
where
    F: DifferentiableFunction + ?Sized,
{
    let mut jac = DMatrix::zeros(f.output_size(), q.len());
    let mut shifted = q.clone();
    for j in 0..q.len() {
        let original = shifted[j];
        shifted[j] = original + FD_STEP;
        let plus = f.value(&shifted);
        shifted[j] = original - FD_STEP;
        let minus = f.value(&shifted);
        shifted[j] = original;
        if plus.len() != jac.nrows() || minus.len() != jac.nrows() {
            let rows = if plus.len() == jac.nrows() { minus.len() } else { plus.len() };
            return DMatrix::zeros(rows, q.len());
        }
        jac.set_column(j, &((plus - minus) / (2.0 * FD_STEP)));
    }
    jac
}

/// `f(q) = [q[rank]]`.
#[derive(Debug, Clone)]
pub struct JointValue {
    name: String,
    rank: usize,
    input_size: usize,
}

impl JointValue {
    /// Reads configuration entry `rank` out of a configuration of size
    /// `input_size`.
    pub fn new(name: impl Into<String>, rank: usize, input_size: usize) -> Self {
        Self {
            name: name.into(),
            rank,
            input_size,
        }
    }
}

impl DifferentiableFunction for JointValue {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        1
    }

    fn value(&self, q: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, q.get(self.rank).copied().unwrap_or(f64::NAN))
    }

    fn jacobian(&self, q: &DVector<f64>) -> DMatrix<f64> {
        let mut jac = DMatrix::zeros(1, q.len());
        if self.rank < q.len() {
            jac[(0, self.rank)] = 1.0;
        }
        jac
    }
}

/// `f(q) = A·q + b`.
#[derive(Debug, Clone)]
pub struct AffineFunction {
    name: String,
    matrix: DMatrix<f64>,
    bias: DVector<f64>,
}

impl AffineFunction {
    /// Builds the function. `bias` must have one entry per row of `matrix`;
    /// a shorter or longer bias is truncated or zero-padded.
    pub fn new(name: impl Into<String>, matrix: DMatrix<f64>, bias: DVector<f64>) -> Self {
        let bias = bias.resize_vertically(matrix.nrows(), 0.0);
        Self {
            name: name.into(),
            matrix,
            bias,
        }
    }

    /// `A·q` with no bias.
    pub fn linear(name: impl Into<String>, matrix: DMatrix<f64>) -> Self {
        let rows = matrix.nrows();
        Self::new(name, matrix, DVector::zeros(rows))
    }
}

impl DifferentiableFunction for AffineFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_size(&self) -> usize {
        self.matrix.ncols()
    }

    fn output_size(&self) -> usize {
        self.matrix.nrows()
    }

    fn value(&self, q: &DVector<f64>) -> DVector<f64> {
        &self.matrix * q + &self.bias
    }

    fn jacobian(&self, _q: &DVector<f64>) -> DMatrix<f64> {
        self.matrix.clone()
    }
}

/// Relative pose between two robot frames, compared with a target.
///
/// Frame `a` is `local_a` on joint `joint_a` (`None` = world), likewise for
/// `b`. The value is `log6(target⁻¹ · Ta⁻¹ · Tb)`: translation then rotation
/// vector, six components, zero when `b` sits at `target` in `a`'s frame.
#[derive(Debug, Clone)]
pub struct RelativeTransformation {
    name: String,
    device: Arc<Device>,
    joint_a: Option<usize>,
    local_a: Pose,
    joint_b: Option<usize>,
    local_b: Pose,
    target: Pose,
}

impl RelativeTransformation {
    /// Relative pose of frame `b` in frame `a`, compared against the identity.
    pub fn new(
        name: impl Into<String>,
        device: Arc<Device>,
        (joint_a, local_a): (Option<usize>, Pose),
        (joint_b, local_b): (Option<usize>, Pose),
    ) -> Self {
        Self {
            name: name.into(),
            device,
            joint_a,
            local_a,
            joint_b,
            local_b,
            target: Pose::identity(),
        }
    }

    /// Compares against `target` instead of the identity.
    pub fn with_target(mut self, target: Pose) -> Self {
        self.target = target;
        self
    }

    /// Pose of frame `b` expressed in frame `a` at `q`.
    pub fn relative_pose(&self, q: &DVector<f64>) -> Pose {
        let poses = self.device.joint_poses(q.as_slice());
        let frame = |joint: Option<usize>, local: &Pose| {
            joint
                .and_then(|j| poses.get(j))
                .copied()
                .unwrap_or_else(Pose::identity)
                .compose(local)
        };
        let a = frame(self.joint_a, &self.local_a);
        let b = frame(self.joint_b, &self.local_b);
        a.inverse().compose(&b)
    }
}

impl DifferentiableFunction for RelativeTransformation {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_size(&self) -> usize {
        self.device.config_size()
    }

    fn output_size(&self) -> usize {
        6
    }

    fn value(&self, q: &DVector<f64>) -> DVector<f64> {
        let error = self.target.inverse().compose(&self.relative_pose(q));
        DVector::from_column_slice(&error.log6())
    }
}
