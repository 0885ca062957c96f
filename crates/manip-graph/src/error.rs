// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy surfaced to callers.
use thiserror::Error;

use crate::constraint::SolverError;

/// Every failure a graph construction or query call can report.
///
/// Nothing here is retried internally; callers decide what to do.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An operation ran before a prerequisite existed (no robot, no graph).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
    /// An id or a constraint name does not resolve.
    #[error("not found: {0}")]
    NotFound(String),
    /// The id resolves, but to the wrong kind of component; or a collaborator
    /// lacks a required capability.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the operation needed.
        expected: &'static str,
        /// What it got.
        found: String,
    },
    /// The operation needs at least one id.
    #[error("ID list is empty")]
    EmptyIdList,
    /// Constraint evaluation or projection failed numerically.
    #[error("solver error: {0}")]
    SolverError(#[from] SolverError),
    /// No node of the graph accepts the configuration.
    #[error("no node of the constraint graph accepts the configuration")]
    NoMatchingNode,
    /// An argument is outside its domain (e.g. a waypoint count of zero).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A configuration does not match the robot's configuration size.
    #[error("configuration has {found} entries, robot expects {expected}")]
    ConfigSize {
        /// Robot configuration size.
        expected: usize,
        /// Length of the supplied configuration.
        found: usize,
    },
    /// Writing a graph description failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;
