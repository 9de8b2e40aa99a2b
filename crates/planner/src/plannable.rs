//! What the planner needs to know about a goal.

use std::fmt;

use crate::condition::{Effect, Precondition};

/// Stable identity of a goal within one registry: its registration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalId(pub usize);

impl GoalId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Planning view of a goal.
///
/// Implementors are free to compute [`cost`](Self::cost) on demand; the
/// planner samples it once per planning call.
pub trait Plannable {
    fn name(&self) -> &str;

    /// Non-negative cost of running this goal.
    fn cost(&self) -> f32;

    fn preconditions(&self) -> &[Precondition];

    fn effects(&self) -> &[Effect];
}

impl<T: Plannable + ?Sized> Plannable for Box<T> {
    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline]
    fn cost(&self) -> f32 {
        (**self).cost()
    }

    #[inline]
    fn preconditions(&self) -> &[Precondition] {
        (**self).preconditions()
    }

    #[inline]
    fn effects(&self) -> &[Effect] {
        (**self).effects()
    }
}
