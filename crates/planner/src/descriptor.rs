//! Validated planning data shared by every concrete goal.

use crate::condition::{Effect, Precondition};
use crate::error::{PlannerError, Result};
use crate::plannable::Plannable;
use crate::predicate::Predicate;

/// Name, cost, preconditions and effects of a goal.
///
/// Concrete goals embed a descriptor for their planning data and keep their
/// behavior and local state next to it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalDescriptor {
    name: String,
    cost: f32,
    preconditions: Vec<Precondition>,
    effects: Vec<Effect>,
}

impl GoalDescriptor {
    pub fn builder(name: impl Into<String>) -> GoalDescriptorBuilder {
        GoalDescriptorBuilder {
            name: name.into(),
            cost: 1.0,
            preconditions: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// Replaces the cost, keeping the same validation as the builder.
    pub fn set_cost(&mut self, cost: f32) -> Result<()> {
        self.cost = validate_cost(&self.name, cost)?;
        Ok(())
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

impl Plannable for GoalDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn cost(&self) -> f32 {
        self.cost
    }

    fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

/// Builder for [`GoalDescriptor`].
///
/// Cost defaults to `1.0`.
#[derive(Debug)]
pub struct GoalDescriptorBuilder {
    name: String,
    cost: f32,
    preconditions: Vec<Precondition>,
    effects: Vec<Effect>,
}

impl GoalDescriptorBuilder {
    pub fn cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn requires(mut self, predicate: Predicate, value: bool) -> Self {
        self.preconditions.push(Precondition::new(predicate, value));
        self
    }

    pub fn requires_described(
        mut self,
        predicate: Predicate,
        value: bool,
        description: impl Into<String>,
    ) -> Self {
        self.preconditions
            .push(Precondition::described(predicate, value, description));
        self
    }

    pub fn precondition(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    pub fn effect(mut self, predicate: Predicate, value: bool) -> Self {
        self.effects.push(Effect::new(predicate, value));
        self
    }

    pub fn build(self) -> Result<GoalDescriptor> {
        if self.name.trim().is_empty() {
            return Err(PlannerError::EmptyGoalName);
        }
        let cost = validate_cost(&self.name, self.cost)?;

        Ok(GoalDescriptor {
            name: self.name,
            cost,
            preconditions: self.preconditions,
            effects: self.effects,
        })
    }
}

/// Checks that `cost` is finite and non-negative.
pub fn validate_cost(goal: &str, cost: f32) -> Result<f32> {
    if cost.is_finite() && cost >= 0.0 {
        Ok(cost)
    } else {
        Err(PlannerError::InvalidCost {
            goal: goal.to_owned(),
            cost,
        })
    }
}
