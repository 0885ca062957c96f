// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The planning session context every operation runs against.
use std::sync::Arc;

use manip_math::{Pose, Vec3};
use nalgebra::DVector;
use tracing::{debug, info, instrument};

use crate::config::SessionConfig;
use crate::constraint::{ComparisonType, DifferentiableFunction, LockedJoint, RelativeTransformation};
use crate::error::{GraphError, Result};
use crate::graph::ConstraintGraph;
use crate::planner::{ManipulationPlanner, PathPlanner};
use crate::projection::Projection;
use crate::registry::ConstraintRegistry;
use crate::roadmap::{ManipulationRoadmap, Roadmap};
use crate::robot::Device;
use crate::ComponentId;

/// A planning session: robot, named constraints, the active constraint
/// graph and the roadmap and planner collaborators.
///
/// Construction calls go through `&mut self` and so run one at a time.
#[derive(Debug)]
pub struct ProblemSolver {
    pub(crate) config: SessionConfig,
    pub(crate) robot: Option<Arc<Device>>,
    pub(crate) constraints: ConstraintRegistry,
    pub(crate) graph: Option<ConstraintGraph>,
    pub(crate) roadmap: Box<dyn Roadmap>,
    pub(crate) planner: Box<dyn PathPlanner>,
}

impl Default for ProblemSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemSolver {
    /// A session with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// A session using `config`, with a [`ManipulationRoadmap`] and a
    /// [`ManipulationPlanner`].
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            robot: None,
            constraints: ConstraintRegistry::default(),
            graph: None,
            roadmap: Box::new(ManipulationRoadmap::new()),
            planner: Box::new(ManipulationPlanner::new(config.planner)),
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The robot, once set.
    pub fn robot(&self) -> Option<&Arc<Device>> {
        self.robot.as_ref()
    }

    /// Named constraints.
    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    /// The active roadmap.
    pub fn roadmap(&self) -> &dyn Roadmap {
        self.roadmap.as_ref()
    }

    /// The active constraint graph.
    pub fn graph(&self) -> Result<&ConstraintGraph> {
        self.graph.as_ref().ok_or_else(no_graph)
    }

    /// Installs `robot` as the session robot.
    #[instrument(skip(self, robot), fields(robot = robot.name()))]
    pub fn set_robot(&mut self, robot: Device) {
        info!(config_size = robot.config_size(), "robot set");
        self.robot = Some(Arc::new(robot));
    }

    /// Installs the composition of `parts` as the session robot.
    #[instrument(skip(self, parts), fields(parts = parts.len()))]
    pub fn build_composite_robot(&mut self, name: &str, parts: &[Device]) {
        self.set_robot(Device::composite(name, parts));
    }

    /// Replaces the roadmap collaborator.
    pub fn set_roadmap(&mut self, roadmap: Box<dyn Roadmap>) {
        debug!(roadmap = roadmap.name(), "roadmap set");
        self.roadmap = roadmap;
    }

    /// Replaces the planner collaborator.
    pub fn set_path_planner(&mut self, planner: Box<dyn PathPlanner>) {
        debug!(planner = planner.name(), "path planner set");
        self.planner = planner;
    }

    /// Iteration cap for projections (session and active graph).
    pub fn set_max_iterations(&mut self, max_iterations: usize) -> Result<()> {
        self.config.solver.max_iterations = max_iterations;
        self.sync_solver_params()
    }

    /// Error threshold for projections (session and active graph).
    pub fn set_error_threshold(&mut self, error_threshold: f64) -> Result<()> {
        self.config.solver.error_threshold = error_threshold;
        self.sync_solver_params()
    }

    fn sync_solver_params(&mut self) -> Result<()> {
        if let Some(graph) = &mut self.graph {
            graph.set_params(self.config.solver)?;
            self.recount_statistics()?;
        }
        Ok(())
    }

    /// Registers a numerical constraint under `name`.
    pub fn add_numerical_constraint(
        &mut self,
        name: &str,
        function: Arc<dyn DifferentiableFunction>,
        comparison: ComparisonType,
    ) {
        self.constraints.add_numerical_constraint(name, function, comparison);
    }

    /// Changes the comparison type of a registered numerical constraint.
    pub fn set_comparison_type(&mut self, name: &str, comparison: ComparisonType) -> Result<()> {
        self.constraints.set_comparison_type(name, comparison)
    }

    /// Registers a locked joint holding `joint` at `value`.
    #[instrument(skip(self))]
    pub fn create_locked_dof_constraint(&mut self, name: &str, joint: &str, value: f64) -> Result<()> {
        let robot = self.require_robot()?;
        let rank = robot.joint_rank(joint).ok_or_else(|| {
            GraphError::NotFound(format!("joint `{joint}` with a configuration entry in `{}`", robot.name()))
        })?;
        self.constraints
            .add_locked_joint(LockedJoint::new(name, joint, rank, value));
        Ok(())
    }

    /// Makes a locked joint take its value from offset configurations.
    pub fn is_locked_dof_parametric(&mut self, name: &str, parametric: bool) -> Result<()> {
        self.constraints
            .locked_joint_mut(name)
            .ok_or_else(|| GraphError::NotFound(format!("locked joint `{name}` is not registered")))?
            .set_parametric(parametric);
        Ok(())
    }

    /// Registers a constraint aligning `gripper` with `handle`.
    #[instrument(skip(self))]
    pub fn create_grasp(&mut self, name: &str, gripper: &str, handle: &str) -> Result<()> {
        self.add_grasp(name, gripper, handle, Pose::identity())
    }

    /// Registers a constraint holding `gripper` `clearance` in front of
    /// `handle` along the handle's x axis.
    #[instrument(skip(self))]
    pub fn create_pre_grasp(&mut self, name: &str, gripper: &str, handle: &str, clearance: f64) -> Result<()> {
        let target = Pose::from_translation(Vec3::new(clearance, 0.0, 0.0));
        self.add_grasp(name, gripper, handle, target)
    }

    fn add_grasp(&mut self, name: &str, gripper: &str, handle: &str, target: Pose) -> Result<()> {
        let robot = Arc::clone(self.require_robot()?);
        let g = robot
            .gripper(gripper)
            .ok_or_else(|| GraphError::NotFound(format!("gripper `{gripper}`")))?;
        let h = robot
            .handle(handle)
            .ok_or_else(|| GraphError::NotFound(format!("handle `{handle}`")))?;
        let function = RelativeTransformation::new(
            name,
            Arc::clone(&robot),
            (h.joint(), h.local()),
            (g.joint(), g.local()),
        )
        .with_target(target);
        self.constraints
            .add_numerical_constraint(name, Arc::new(function), ComparisonType::EqualToZero);
        Ok(())
    }

    /// The node `config` belongs to.
    #[instrument(skip(self, config))]
    pub fn get_node(&self, config: &[f64]) -> Result<ComponentId> {
        let graph = self.graph()?;
        graph.get_node(&self.to_config(config)?)
    }

    /// Projects `input` onto the intersection of the listed nodes.
    #[instrument(skip(self, input))]
    pub fn apply_constraints(&self, nodes: &[ComponentId], input: &[f64]) -> Result<Projection> {
        if nodes.is_empty() {
            return Err(GraphError::EmptyIdList);
        }
        let graph = self.graph()?;
        let q = self.to_config(input)?;
        let mut set = graph.config_constraint_for_nodes(nodes)?;
        Projection::compute(&mut set, None, q)
    }

    /// Projects `input` onto the listed edges' constraints anchored at
    /// `q_near`.
    #[instrument(skip(self, q_near, input))]
    pub fn apply_constraints_with_offset(
        &self,
        edges: &[ComponentId],
        q_near: &[f64],
        input: &[f64],
    ) -> Result<Projection> {
        if edges.is_empty() {
            return Err(GraphError::EmptyIdList);
        }
        let graph = self.graph()?;
        let near = self.to_config(q_near)?;
        let q = self.to_config(input)?;
        let mut set = graph.config_constraint_for_edges(edges)?;
        Projection::compute(&mut set, Some(&near), q)
    }

    /// One graph-aware planner step from `q_near` toward `q_rand`.
    ///
    /// Returns the configuration reached, or `q_near` unchanged when no
    /// transition made progress. Reached configurations join the roadmap.
    #[instrument(skip(self, q_near, q_rand))]
    pub fn extend(&mut self, q_near: &[f64], q_rand: &[f64]) -> Result<Vec<f64>> {
        // Converted up front; a planner without the capability is reported
        // before any configuration error.
        let near = self.to_config(q_near);
        let rand = self.to_config(q_rand);
        let Some(planner) = self.planner.as_graph_aware() else {
            return Err(GraphError::TypeMismatch {
                expected: "graph-aware path planner",
                found: self.planner.name().to_owned(),
            });
        };
        let (near, rand) = (near?, rand?);
        let graph = self.graph.as_ref().ok_or_else(no_graph)?;
        match planner.extend(graph, &near, &rand)? {
            Some(path) => {
                let reached = path.end().clone();
                self.roadmap.add_configuration(&reached)?;
                Ok(reached.as_slice().to_vec())
            }
            None => Ok(q_near.to_vec()),
        }
    }

    /// Empties and refills the roadmap's histograms after their conditions
    /// changed. Roadmaps without statistics have nothing to redo.
    pub(crate) fn recount_statistics(&mut self) -> Result<()> {
        if let Some(stats) = self.roadmap.statistics_mut() {
            stats.recount()?;
        }
        Ok(())
    }

    pub(crate) fn require_robot(&self) -> Result<&Arc<Device>> {
        self.robot
            .as_ref()
            .ok_or_else(|| GraphError::PreconditionViolation("no robot has been set".to_owned()))
    }

    /// Checks `values` against the robot and wraps them as a configuration.
    pub(crate) fn to_config(&self, values: &[f64]) -> Result<DVector<f64>> {
        let expected = self.require_robot()?.config_size();
        if values.len() != expected {
            return Err(GraphError::ConfigSize {
                expected,
                found: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GraphError::InvalidArgument(
                "configuration contains non-finite values".to_owned(),
            ));
        }
        Ok(DVector::from_column_slice(values))
    }
}

pub(crate) fn no_graph() -> GraphError {
    GraphError::PreconditionViolation("no constraint graph has been created".to_owned())
}
