//! The closed set of world facts the planner reasons about.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr, IntoEnumIterator};

use crate::error::{PlannerError, Result};

/// A named boolean fact about the world.
///
/// The set is fixed at build time. Names use kebab-case both in
/// [`Display`](std::fmt::Display) output and when parsed from profiles, e.g.
/// `has-target` or `within-pull-range`.
///
/// Predicates carry no ordering; identity is nominal.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[repr(u8)]
pub enum Predicate {
    /// The character has something selected.
    HasTarget,
    /// The selected target is alive.
    TargetIsAlive,
    /// The character is in combat.
    InCombat,
    /// Combat with more than one attacker.
    DangerCombat,
    /// Target is close enough to start a pull.
    WithinPullRange,
    /// Target is close enough for the combat rotation.
    InCombatRange,
    /// The target has been pulled.
    Pulled,
    /// A fight is underway.
    Fighting,
    /// A corpse is waiting to be looted.
    ShouldLoot,
    /// A looted corpse can be skinned.
    ShouldSkin,
    /// A kill produced a corpse this cycle.
    ProducedCorpse,
    /// Corpses are waiting to be consumed by the loot chain.
    ConsumableCorpse,
    /// Equipment durability reached zero.
    ItemsBroken,
    /// The character is dead.
    IsDead,
    /// The character is swimming.
    IsSwimming,
    /// A new target was acquired since the last pull.
    NewTarget,
    /// The pet has a target.
    PetHasTarget,
    /// Resources are being gathered.
    Gathering,
    /// Signal: stop what you are doing.
    Abort,
    /// Signal: the loop (re)started; reset timers.
    Resume,
}

// Fact bases store predicates as bit positions in a u64.
const _: () = assert!(<Predicate as EnumCount>::COUNT <= 64);

impl Predicate {
    /// Number of predicates.
    pub const COUNT: usize = <Self as EnumCount>::COUNT;

    /// Parses a kebab-case predicate name.
    ///
    /// Unknown names are a construction-time fault reported to whoever is
    /// assembling goals; the planner never sees them.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse().map_err(|_| PlannerError::UnknownPredicate {
            name: name.to_owned(),
        })
    }

    /// Returns the predicate's kebab-case name.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Position of this predicate in declaration order.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this predicate.
    #[inline]
    pub(crate) const fn bit(self) -> u64 {
        1u64 << (self as u8)
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Iterates over every predicate in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_kebab_case() {
        assert_eq!(Predicate::HasTarget.to_string(), "has-target");
        assert_eq!(Predicate::WithinPullRange.as_str(), "within-pull-range");
        assert_eq!(Predicate::parse("should-skin").unwrap(), Predicate::ShouldSkin);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = Predicate::parse("has_target").unwrap_err();
        assert_eq!(
            err,
            PlannerError::UnknownPredicate {
                name: "has_target".into()
            }
        );
    }

    #[test]
    fn index_round_trips() {
        for predicate in Predicate::all() {
            assert_eq!(Predicate::from_index(predicate.index()), Some(predicate));
        }
        assert_eq!(Predicate::from_index(Predicate::COUNT), None);
    }
}
