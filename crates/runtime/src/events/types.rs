use std::fmt;

use goap_planner::{GoalId, Predicate};
use serde::{Deserialize, Serialize};

/// A `(predicate, value)` notification emitted by a goal.
///
/// Signals are transient: they are not written into the world facts. The
/// emitter never receives its own signal. `source` is `None` for signals
/// issued by the execution loop itself (the start-up `resume`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub source: Option<GoalId>,
    pub predicate: Predicate,
    pub value: bool,
}

impl GoalEvent {
    pub fn from_goal(source: GoalId, predicate: Predicate, value: bool) -> Self {
        Self {
            source: Some(source),
            predicate,
            value,
        }
    }

    pub fn broadcast(predicate: Predicate, value: bool) -> Self {
        Self {
            source: None,
            predicate,
            value,
        }
    }

    /// `true` when this is `predicate = true`.
    pub fn is(&self, predicate: Predicate) -> bool {
        self.predicate == predicate && self.value
    }
}

impl fmt::Display for GoalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.predicate, self.value)
    }
}

/// Lifecycle phase of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalPhase {
    Enter,
    Perform,
    Exit,
}

impl fmt::Display for GoalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GoalPhase::Enter => "enter",
            GoalPhase::Perform => "perform",
            GoalPhase::Exit => "exit",
        })
    }
}

/// Execution loop transitions published for supervisors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LifecycleEvent {
    Started,
    /// A new plan head was chosen.
    PlanChanged { steps: Vec<String>, cost: f32 },
    Entered { goal: String },
    Exited { goal: String },
    Fault {
        goal: String,
        phase: GoalPhase,
        error: String,
    },
    /// No goal chain reaches the objective from the current facts.
    NoRoute,
    Stopped,
}
