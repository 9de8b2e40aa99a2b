//! The goal contract driven by the execution loop.
//!
//! A goal is both a planning step (descriptor: name, cost, preconditions,
//! effects) and a stateful behavior (lifecycle). Goals are owned by the
//! agent for its whole lifetime and keep their local state across cycles.

mod context;
mod cooldown;

pub use context::GoalContext;
pub use cooldown::CooldownRegistry;

use goap_planner::GoalDescriptor;

use crate::api::GoalError;
use crate::events::GoalEvent;

/// A goal the agent can plan with and the execution loop can drive.
///
/// Lifecycle guarantees: `enter` runs once when the goal becomes the active
/// plan step, `perform` once per tick while it stays active, and `exit`
/// exactly once when it stops being active (plan change, fault, stop).
pub trait Goal: Send {
    fn descriptor(&self) -> &GoalDescriptor;

    fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// Current cost. Read once per planning cycle; must be finite and
    /// non-negative.
    fn cost(&self) -> f32 {
        self.descriptor().cost()
    }

    /// Dynamic admissibility gate. Cheap and free of side effects; `false`
    /// hides the goal from the planner for this cycle.
    fn can_run(&self) -> bool {
        true
    }

    fn enter(&mut self, _ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        Ok(())
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError>;

    fn exit(&mut self, _ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        Ok(())
    }

    /// Signal from another goal. May only touch this goal's own state.
    fn on_event(&mut self, _event: &GoalEvent) {}
}
