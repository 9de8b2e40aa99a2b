//! Result of one planning call.

use crate::plannable::GoalId;

/// One goal in a plan, with the cost it had when the plan was built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanStep {
    pub goal: GoalId,
    pub name: String,
    pub cost: f32,
}

/// Ordered goals expected to satisfy the objective, as a stack.
///
/// The top of the stack ([`peek`](Self::peek)) is the first goal to
/// execute. An empty plan means "no route to the objective under the current
/// facts"; it is not an error.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    // last element is the top of the stack
    stack: Vec<PlanStep>,
    total_cost: f32,
}

impl Plan {
    pub const fn empty() -> Self {
        Self {
            stack: Vec::new(),
            total_cost: 0.0,
        }
    }

    /// Builds a plan from steps in execution order.
    pub fn from_steps(steps: impl IntoIterator<Item = PlanStep>) -> Self {
        let mut stack: Vec<PlanStep> = steps.into_iter().collect();
        stack.reverse();
        let total_cost = stack.iter().rev().map(|s| s.cost).sum();
        Self { stack, total_cost }
    }

    /// Builds a plan from a stack whose last element is executed first.
    pub(crate) fn from_stack(stack: Vec<PlanStep>, total_cost: f32) -> Self {
        Self { stack, total_cost }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Sum of the step costs sampled when the plan was built.
    pub fn total_cost(&self) -> f32 {
        self.total_cost
    }

    /// The next goal to execute.
    pub fn peek(&self) -> Option<&PlanStep> {
        self.stack.last()
    }

    /// Removes and returns the next goal to execute.
    pub fn pop(&mut self) -> Option<PlanStep> {
        self.stack.pop()
    }

    /// Steps in execution order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PlanStep> + ExactSizeIterator {
        self.stack.iter().rev()
    }

    /// Goal ids in execution order.
    pub fn goals(&self) -> impl Iterator<Item = GoalId> + '_ {
        self.iter().map(|s| s.goal)
    }

    /// Goal names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|s| s.name.as_str()).collect()
    }
}
