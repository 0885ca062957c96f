// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named constraints registered with a session before they are attached to
//! graph components.
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::constraint::{
    ComparisonType, Constraints, DifferentiableFunction, LockedJoint, NumericalConstraint,
};
use crate::error::{GraphError, Result};

/// Exact-name lookup of numerical constraints and locked joints.
#[derive(Debug, Default)]
pub struct ConstraintRegistry {
    numerical: FxHashMap<String, Arc<dyn DifferentiableFunction>>,
    comparison: FxHashMap<String, ComparisonType>,
    locked: FxHashMap<String, LockedJoint>,
}

impl ConstraintRegistry {
    /// Registers (or replaces) a numerical constraint under `name`.
    pub fn add_numerical_constraint(
        &mut self,
        name: &str,
        function: Arc<dyn DifferentiableFunction>,
        comparison: ComparisonType,
    ) {
        debug!(constraint = name, function = function.name(), ?comparison, "numerical constraint registered");
        self.numerical.insert(name.to_owned(), function);
        self.comparison.insert(name.to_owned(), comparison);
    }

    /// Changes how the constraint `name` compares with its right-hand side.
    pub fn set_comparison_type(&mut self, name: &str, comparison: ComparisonType) -> Result<()> {
        let slot = self
            .comparison
            .get_mut(name)
            .ok_or_else(|| unknown("numerical constraint", name))?;
        *slot = comparison;
        Ok(())
    }

    /// The numerical constraint `name` with its current comparison type.
    pub fn numerical_constraint(&self, name: &str) -> Option<NumericalConstraint> {
        let function = self.numerical.get(name)?;
        Some(NumericalConstraint::new(
            Arc::clone(function),
            self.comparison_type(name).unwrap_or_default(),
        ))
    }

    /// Comparison type of `name`.
    pub fn comparison_type(&self, name: &str) -> Option<ComparisonType> {
        self.comparison.get(name).copied()
    }

    /// Registers (or replaces) a locked joint under its name.
    pub fn add_locked_joint(&mut self, locked: LockedJoint) {
        debug!(constraint = locked.name(), joint = locked.joint(), value = locked.value(), "locked joint registered");
        self.locked.insert(locked.name().to_owned(), locked);
    }

    /// The locked joint `name`.
    pub fn locked_joint(&self, name: &str) -> Option<&LockedJoint> {
        self.locked.get(name)
    }

    /// Mutable access to the locked joint `name`.
    pub fn locked_joint_mut(&mut self, name: &str) -> Option<&mut LockedJoint> {
        self.locked.get_mut(name)
    }

    /// Resolves every name or none: the first unknown name fails the batch.
    pub fn resolve_numerical<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<NumericalConstraint>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.numerical_constraint(name)
                    .ok_or_else(|| unknown("numerical constraint", name))
            })
            .collect()
    }

    /// Resolves every locked joint name or none.
    pub fn resolve_locked<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<LockedJoint>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.locked_joint(name)
                    .cloned()
                    .ok_or_else(|| unknown("locked joint", name))
            })
            .collect()
    }

    /// Resolves both lists into one batch.
    pub fn resolve<S: AsRef<str>, L: AsRef<str>>(&self, numerical: &[S], locked: &[L]) -> Result<Constraints> {
        Ok(Constraints {
            numerical: self.resolve_numerical(numerical)?,
            locked: self.resolve_locked(locked)?,
        })
    }
}

fn unknown(what: &str, name: &str) -> GraphError {
    GraphError::NotFound(format!("{what} `{name}` is not registered"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::JointValue;

    #[test]
    fn batches_resolve_all_or_nothing() {
        let mut reg = ConstraintRegistry::default();
        reg.add_numerical_constraint("x", Arc::new(JointValue::new("x", 0, 2)), ComparisonType::Equality);
        assert_eq!(reg.resolve_numerical(&["x"]).expect("x").len(), 1);
        assert!(matches!(reg.resolve_numerical(&["x", "nope"]), Err(GraphError::NotFound(_))));
        let none: [&str; 0] = [];
        assert!(reg.resolve_locked(&none).expect("empty").is_empty());
    }

    #[test]
    fn comparison_type_follows_updates() {
        let mut reg = ConstraintRegistry::default();
        reg.add_numerical_constraint("x", Arc::new(JointValue::new("x", 0, 1)), ComparisonType::Equality);
        reg.set_comparison_type("x", ComparisonType::Superior).expect("set");
        let c = reg.numerical_constraint("x").expect("x");
        assert_eq!(c.comparison(), ComparisonType::Superior);
        assert!(reg.set_comparison_type("y", ComparisonType::Inferior).is_err());
    }
}
