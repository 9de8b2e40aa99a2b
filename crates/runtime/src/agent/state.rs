use std::collections::BTreeMap;

use goap_planner::{FactBase, GoalId, Predicate};
use serde::{Deserialize, Serialize};

/// Auxiliary state shared by every goal through the agent.
///
/// Holds what does not belong to any single goal: kill and corpse
/// accounting, free-form counters and flags, and the last value seen for
/// every signal on the bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    consumable_corpses: u32,
    kills: u64,
    counters: BTreeMap<String, i64>,
    flags: BTreeMap<String, bool>,
    signals: FactBase,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A target died and left a corpse that loot/skin goals may consume.
    pub fn record_kill(&mut self) {
        self.kills += 1;
        self.consumable_corpses += 1;
    }

    /// Takes one corpse off the pile. Returns `false` if there was none.
    pub fn consume_corpse(&mut self) -> bool {
        if self.consumable_corpses == 0 {
            return false;
        }
        self.consumable_corpses -= 1;
        true
    }

    pub fn consumable_corpses(&self) -> u32 {
        self.consumable_corpses
    }

    pub fn kills(&self) -> u64 {
        self.kills
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Adds `delta` and returns the new value.
    pub fn add(&mut self, name: &str, delta: i64) -> i64 {
        let slot = self.counters.entry(name.to_owned()).or_insert(0);
        *slot += delta;
        *slot
    }

    pub fn increment(&mut self, name: &str) -> i64 {
        self.add(name, 1)
    }

    pub fn reset(&mut self, name: &str) {
        self.counters.remove(name);
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_owned(), value);
    }

    /// Last value broadcast for `predicate`, if any goal ever emitted it.
    pub fn signal(&self, predicate: Predicate) -> Option<bool> {
        self.signals.get(predicate)
    }

    pub fn signals(&self) -> &FactBase {
        &self.signals
    }

    pub(crate) fn record_signal(&mut self, predicate: Predicate, value: bool) {
        self.signals.set(predicate, value);
    }
}

/// One precondition of a goal evaluated against the live facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionState {
    pub description: String,
    pub satisfied: bool,
}

/// Per-goal diagnostic computed every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalStatus {
    pub id: GoalId,
    pub name: String,
    /// Cost read during the refresh; the planner uses this value.
    pub cost: f32,
    /// `can_run` returned `true` and the cost was valid.
    pub admissible: bool,
    pub preconditions: Vec<PreconditionState>,
}

impl GoalStatus {
    /// Admissible and every precondition currently holds.
    pub fn is_ready(&self) -> bool {
        self.admissible && self.preconditions.iter().all(|p| p.satisfied)
    }

    pub fn unmet(&self) -> impl Iterator<Item = &str> {
        self.preconditions
            .iter()
            .filter(|p| !p.satisfied)
            .map(|p| p.description.as_str())
    }
}

/// Point-in-time view of the agent for supervisors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub active: Option<String>,
    /// Plan in execution order.
    pub plan: Vec<String>,
    pub plan_cost: f32,
    pub facts: FactBase,
    pub goals: Vec<GoalStatus>,
    pub state: AgentState,
}
