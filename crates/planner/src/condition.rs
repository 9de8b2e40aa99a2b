//! Preconditions, effects and goal conditions.

use crate::error::Result;
use crate::facts::FactBase;
use crate::predicate::Predicate;

/// A requirement a goal places on the world before it can run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Precondition {
    pub predicate: Predicate,
    pub required: bool,
    /// Human-readable label used in diagnostics.
    pub description: String,
}

impl Precondition {
    /// Creates a precondition described by its predicate name, prefixed with
    /// `!` when the predicate is required to be false.
    pub fn new(predicate: Predicate, required: bool) -> Self {
        let description = if required {
            predicate.as_str().to_owned()
        } else {
            format!("!{}", predicate.as_str())
        };
        Self {
            predicate,
            required,
            description,
        }
    }

    /// Creates a precondition with a custom description.
    pub fn described(predicate: Predicate, required: bool, description: impl Into<String>) -> Self {
        Self {
            predicate,
            required,
            description: description.into(),
        }
    }

    /// Parses the predicate name.
    pub fn parse(name: &str, required: bool) -> Result<Self> {
        Ok(Self::new(Predicate::parse(name)?, required))
    }

    /// Returns `true` if `facts` knows the predicate and it has the required
    /// value. Unknown predicates never satisfy a precondition.
    #[inline]
    pub fn is_met_by(&self, facts: &FactBase) -> bool {
        facts.holds(self.predicate, self.required)
    }
}

/// The simulated outcome of running a goal.
///
/// Effects are only used for forward search; they are never verified
/// against reality at plan-build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub predicate: Predicate,
    pub value: bool,
}

impl Effect {
    pub const fn new(predicate: Predicate, value: bool) -> Self {
        Self { predicate, value }
    }

    /// Parses the predicate name.
    pub fn parse(name: &str, value: bool) -> Result<Self> {
        Ok(Self::new(Predicate::parse(name)?, value))
    }
}

/// Set of required predicate values the planner searches towards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalCondition {
    required: FactBase,
}

impl GoalCondition {
    pub const fn new() -> Self {
        Self {
            required: FactBase::new(),
        }
    }

    /// Adds a required value; a later requirement on the same predicate
    /// replaces the earlier one.
    #[must_use]
    pub fn require(mut self, predicate: Predicate, value: bool) -> Self {
        self.required.set(predicate, value);
        self
    }

    /// Returns `true` if every requirement is present in `facts` with the
    /// required value.
    #[inline]
    pub fn is_met_by(&self, facts: &FactBase) -> bool {
        facts.contains_all(&self.required)
    }

    /// Requirements as a fact base.
    pub fn as_facts(&self) -> &FactBase {
        &self.required
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    pub fn len(&self) -> usize {
        self.required.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Predicate, bool)> + '_ {
        self.required.iter()
    }
}

impl FromIterator<(Predicate, bool)> for GoalCondition {
    fn from_iter<I: IntoIterator<Item = (Predicate, bool)>>(iter: I) -> Self {
        Self {
            required: iter.into_iter().collect(),
        }
    }
}
