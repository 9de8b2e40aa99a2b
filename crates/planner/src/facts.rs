//! Partial mapping from predicates to truth values.

use std::fmt;

use crate::condition::Effect;
use crate::predicate::Predicate;

/// The agent's belief about the world: predicate → bool, with absent keys.
///
/// Stored as two bit masks so that copies are free; the planner threads a
/// fresh copy through every search node and never mutates the caller's value.
///
/// An absent predicate is *unknown*, which is different from `false`: testing
/// an absent predicate against any required value fails.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "Vec<(Predicate, bool)>", from = "Vec<(Predicate, bool)>")
)]
pub struct FactBase {
    known: u64,
    values: u64,
}

impl FactBase {
    /// Creates an empty fact base (every predicate unknown).
    pub const fn new() -> Self {
        Self {
            known: 0,
            values: 0,
        }
    }

    /// Returns the value of `predicate`, or `None` if it is unknown.
    #[inline]
    pub fn get(&self, predicate: Predicate) -> Option<bool> {
        let bit = predicate.bit();
        (self.known & bit != 0).then_some(self.values & bit != 0)
    }

    /// Returns `true` if `predicate` is known and equal to `value`.
    #[inline]
    pub fn holds(&self, predicate: Predicate, value: bool) -> bool {
        self.get(predicate) == Some(value)
    }

    /// Returns `true` if `predicate` has a value.
    #[inline]
    pub fn contains(&self, predicate: Predicate) -> bool {
        self.known & predicate.bit() != 0
    }

    /// Sets `predicate` to `value`, overwriting any previous value.
    #[inline]
    pub fn set(&mut self, predicate: Predicate, value: bool) {
        let bit = predicate.bit();
        self.known |= bit;
        if value {
            self.values |= bit;
        } else {
            self.values &= !bit;
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, predicate: Predicate, value: bool) -> Self {
        self.set(predicate, value);
        self
    }

    /// Forgets the value of `predicate`.
    #[inline]
    pub fn unset(&mut self, predicate: Predicate) {
        let bit = predicate.bit();
        self.known &= !bit;
        self.values &= !bit;
    }

    /// Returns `true` if every entry of `required` is present here with the
    /// same value.
    #[inline]
    pub fn contains_all(&self, required: &FactBase) -> bool {
        required.known & !self.known == 0 && (self.values ^ required.values) & required.known == 0
    }

    /// Overwrites matching predicates with `other`'s values and adds the
    /// ones not seen before.
    #[inline]
    pub fn merge(&mut self, other: &FactBase) {
        self.known |= other.known;
        self.values = (self.values & !other.known) | other.values;
    }

    /// Applies effects in order; later effects on the same predicate win.
    pub fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            self.set(effect.predicate, effect.value);
        }
    }

    /// Returns a copy with `effects` applied.
    #[must_use]
    pub fn applied(&self, effects: &[Effect]) -> Self {
        let mut next = *self;
        next.apply(effects);
        next
    }

    /// Number of known predicates.
    pub fn len(&self) -> usize {
        self.known.count_ones() as usize
    }

    /// Returns `true` if no predicate is known.
    pub fn is_empty(&self) -> bool {
        self.known == 0
    }

    /// Iterates over known predicates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Predicate, bool)> + '_ {
        Predicate::all().filter_map(|p| self.get(p).map(|v| (p, v)))
    }
}

impl fmt::Debug for FactBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(p, v)| (p.as_str(), v)))
            .finish()
    }
}

impl FromIterator<(Predicate, bool)> for FactBase {
    fn from_iter<I: IntoIterator<Item = (Predicate, bool)>>(iter: I) -> Self {
        let mut facts = FactBase::new();
        facts.extend(iter);
        facts
    }
}

impl Extend<(Predicate, bool)> for FactBase {
    fn extend<I: IntoIterator<Item = (Predicate, bool)>>(&mut self, iter: I) {
        for (predicate, value) in iter {
            self.set(predicate, value);
        }
    }
}

impl From<FactBase> for Vec<(Predicate, bool)> {
    fn from(facts: FactBase) -> Self {
        facts.iter().collect()
    }
}

impl From<Vec<(Predicate, bool)>> for FactBase {
    fn from(entries: Vec<(Predicate, bool)>) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Predicate::*;

    #[test]
    fn absent_is_not_false() {
        let facts = FactBase::new().with(InCombat, false);

        assert_eq!(facts.get(InCombat), Some(false));
        assert_eq!(facts.get(HasTarget), None);
        assert!(facts.holds(InCombat, false));
        assert!(!facts.holds(HasTarget, false));
    }

    #[test]
    fn set_overwrites_and_unset_forgets() {
        let mut facts = FactBase::new();
        facts.set(Pulled, true);
        facts.set(Pulled, false);
        assert_eq!(facts.get(Pulled), Some(false));
        assert_eq!(facts.len(), 1);

        facts.unset(Pulled);
        assert!(facts.is_empty());
        assert!(!facts.contains(Pulled));
    }

    #[test]
    fn contains_all_requires_presence_and_equality() {
        let facts = FactBase::new().with(HasTarget, true).with(InCombat, false);

        assert!(facts.contains_all(&FactBase::new().with(HasTarget, true)));
        assert!(facts.contains_all(&FactBase::new()));
        assert!(!facts.contains_all(&FactBase::new().with(InCombat, true)));
        assert!(!facts.contains_all(&FactBase::new().with(Pulled, false)));
    }

    #[test]
    fn effects_overwrite_and_add() {
        let facts = FactBase::new().with(Pulled, false);
        let next = facts.applied(&[Effect::new(Pulled, true), Effect::new(Fighting, true)]);

        assert_eq!(next.get(Pulled), Some(true));
        assert_eq!(next.get(Fighting), Some(true));
        // source untouched
        assert_eq!(facts.get(Pulled), Some(false));
        assert_eq!(facts.get(Fighting), None);
    }

    #[test]
    fn merge_matches_apply() {
        let base = FactBase::new().with(HasTarget, true).with(Pulled, false);
        let effects = [Effect::new(Pulled, true), Effect::new(ShouldLoot, false)];

        let mut merged = base;
        merged.merge(&effects.iter().map(|e| (e.predicate, e.value)).collect());

        assert_eq!(merged, base.applied(&effects));
    }

    #[test]
    fn iterates_in_declaration_order() {
        let facts: FactBase = [(Resume, true), (HasTarget, false)].into_iter().collect();
        let entries: Vec<_> = facts.iter().collect();
        assert_eq!(entries, vec![(HasTarget, false), (Resume, true)]);
    }
}
