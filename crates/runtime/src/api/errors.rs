//! Unified error types surfaced by the runtime API.
//!
//! Construction faults are reported by [`RuntimeError`] from the builder;
//! goal faults ([`GoalError`]) never leave the execution loop, they are
//! logged, counted and published as lifecycle events.
use std::time::Duration;

use goap_planner::PlannerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires at least one goal")]
    NoGoals,

    #[error("runtime requires a non-empty objective")]
    EmptyObjective,

    #[error("goal `{name}` is registered more than once")]
    DuplicateGoal { name: String },

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("execution loop join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

/// Fault raised by a goal's `enter`, `perform` or `exit`.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("interrupted by stop request")]
    Interrupted,

    #[error(transparent)]
    Actuation(#[from] ActuationError),

    #[error("panicked: {0}")]
    Panicked(String),
}

impl GoalError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Failure reported by an [`Actuator`](crate::Actuator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuationError {
    #[error("unknown actuation `{name}`")]
    Unknown { name: String },

    #[error("actuation `{name}` failed: {reason}")]
    Failed { name: String, reason: String },
}

/// Failure reported by a [`FactSource`](crate::FactSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("fact source unavailable: {0}")]
    Unavailable(String),

    #[error("fact source read failed: {0}")]
    Read(String),
}
