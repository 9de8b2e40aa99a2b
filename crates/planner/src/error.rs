//! Construction-time errors.
//!
//! Planning itself never fails: "no route" is an empty [`Plan`](crate::Plan).
//! These errors surface while goals are being assembled from configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("unknown predicate `{name}`")]
    UnknownPredicate { name: String },

    #[error("goal `{goal}` has invalid cost {cost} (must be finite and non-negative)")]
    InvalidCost { goal: String, cost: f32 },

    #[error("goal name must not be empty")]
    EmptyGoalName,
}
