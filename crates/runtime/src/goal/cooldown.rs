use std::collections::HashMap;
use std::time::{Duration, Instant};

use goap_planner::GoalId;

/// Last-use timestamps keyed by goal identity and a goal-chosen key.
///
/// Owned by the agent; each goal only sees its own keys through
/// [`GoalContext`](super::GoalContext).
#[derive(Debug, Default)]
pub struct CooldownRegistry {
    used: HashMap<GoalId, HashMap<String, Instant>>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, goal: GoalId, key: &str, at: Instant) {
        let keys = self.used.entry(goal).or_default();
        match keys.get_mut(key) {
            Some(last) => *last = at,
            None => {
                keys.insert(key.to_owned(), at);
            }
        }
    }

    pub fn last_used(&self, goal: GoalId, key: &str) -> Option<Instant> {
        self.used.get(&goal)?.get(key).copied()
    }

    /// `true` if `key` was never used, or was last used at least `period` ago.
    pub fn is_ready(&self, goal: GoalId, key: &str, period: Duration, now: Instant) -> bool {
        self.last_used(goal, key)
            .is_none_or(|last| now.saturating_duration_since(last) >= period)
    }

    pub fn clear(&mut self, goal: GoalId) {
        self.used.remove(&goal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_key_is_ready() {
        let registry = CooldownRegistry::new();
        assert!(registry.is_ready(GoalId(0), "loot", Duration::from_secs(1), Instant::now()));
    }

    #[test]
    fn key_cools_down_per_goal() {
        let mut registry = CooldownRegistry::new();
        let t0 = Instant::now();
        let period = Duration::from_millis(500);

        registry.mark(GoalId(0), "interact", t0);

        assert!(!registry.is_ready(GoalId(0), "interact", period, t0 + Duration::from_millis(100)));
        assert!(registry.is_ready(GoalId(0), "interact", period, t0 + period));
        assert!(registry.is_ready(GoalId(1), "interact", period, t0));
        assert!(registry.is_ready(GoalId(0), "other", period, t0));
    }

    #[test]
    fn mark_overwrites_and_clear_forgets() {
        let mut registry = CooldownRegistry::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(2);

        registry.mark(GoalId(3), "jump", t0);
        registry.mark(GoalId(3), "jump", t1);
        assert_eq!(registry.last_used(GoalId(3), "jump"), Some(t1));

        registry.clear(GoalId(3));
        assert_eq!(registry.last_used(GoalId(3), "jump"), None);
    }
}
