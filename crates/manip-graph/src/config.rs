// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session configuration, persisted through a [`manip_config::ConfigStore`].
use manip_config::{ConfigError, ConfigService, ConfigStore};
use serde::{Deserialize, Serialize};

/// Key under which [`SessionConfig`] is stored.
pub const SESSION_CONFIG_KEY: &str = "session";

/// Numerical projector limits copied into every new graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Gauss–Newton iteration cap.
    pub max_iterations: usize,
    /// Error norm under which a configuration counts as satisfying.
    pub error_threshold: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            max_iterations: 40,
            error_threshold: 1e-4,
        }
    }
}

/// Graph-aware planner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerParams {
    /// Seed for edge selection and leaf sampling.
    pub seed: u64,
    /// Samples checked along each interpolated path segment.
    pub interpolation_steps: usize,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            interpolation_steps: 10,
        }
    }
}

/// Foliation histogram settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramParams {
    /// Two leaf values closer than this (max-norm) share a bin.
    pub leaf_tolerance: f64,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            leaf_tolerance: 1e-3,
        }
    }
}

/// Everything a [`crate::ProblemSolver`] reads at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Projector limits.
    pub solver: SolverParams,
    /// Planner settings.
    pub planner: PlannerParams,
    /// Histogram settings.
    pub histogram: HistogramParams,
}

impl SessionConfig {
    /// Loads the session config, falling back to defaults when absent.
    pub fn load<S: ConfigStore>(service: &ConfigService<S>) -> Result<Self, ConfigError> {
        service.load_or_default(SESSION_CONFIG_KEY)
    }

    /// Persists the session config.
    pub fn save<S: ConfigStore>(&self, service: &ConfigService<S>) -> Result<(), ConfigError> {
        service.save(SESSION_CONFIG_KEY, self)
    }
}
