//! Goal-oriented action planning over boolean world facts.
//!
//! This crate is the pure half of the decision core: it knows nothing about
//! threads, clocks, sensors or input devices. Given the goals that are usable
//! this cycle, a snapshot of the world and an objective, [`Planner`] returns
//! the cheapest ordered chain of goals whose simulated effects satisfy the
//! objective.
//!
//! - **Forward search**: every path is built from the real facts outwards
//! - **No repetition**: a goal appears at most once in a plan
//! - **Deterministic**: ties resolve by the order goals are supplied in
//! - **Copy-only state**: simulated fact bases are values, the caller's
//!   snapshot is never touched
//!
//! # Architecture
//!
//! - [`Predicate`]: the closed set of world facts
//! - [`FactBase`]: partial mapping predicate → bool
//! - [`Precondition`], [`Effect`], [`GoalCondition`]: the planning contract
//! - [`Plannable`]: what the planner needs to know about a goal
//! - [`GoalDescriptor`]: validated name/cost/precondition/effect bundle
//! - [`Planner`], [`Plan`]: search and its result

pub mod condition;
pub mod descriptor;
pub mod error;
pub mod facts;
pub mod plan;
pub mod plannable;
pub mod planner;
pub mod predicate;

// Re-export core types for ergonomic API
pub use condition::{Effect, GoalCondition, Precondition};
pub use descriptor::{GoalDescriptor, GoalDescriptorBuilder, validate_cost};
pub use error::{PlannerError, Result};
pub use facts::FactBase;
pub use plan::{Plan, PlanStep};
pub use plannable::{GoalId, Plannable};
pub use planner::{Planner, Search};
pub use predicate::Predicate;
