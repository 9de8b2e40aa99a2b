//! Seeded stand-in for the game client.
//!
//! One [`World`] backs both boundaries of the core: [`WorldSensor`] reads it
//! into facts, [`WorldActuator`] changes it. Actuations also republish the
//! facts straight away, so a goal waiting on the outcome sees it on its next
//! poll.
use std::sync::{Arc, Mutex, MutexGuard};

use goap_planner::{FactBase, Predicate};
use goap_runtime::{Actuation, ActuationError, Actuator, FactSource, SensorError, SharedFacts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, trace};

const PULL_RANGE: f32 = 30.0;
const MELEE_RANGE: f32 = 5.0;
const STEP: f32 = 15.0;
const SPAWN_CHANCE: f64 = 0.6;

#[derive(Debug, Error)]
#[error("world state lock poisoned")]
pub struct Poisoned;

#[derive(Debug, Clone, Copy)]
struct Mob {
    distance: f32,
    health: u32,
}

#[derive(Debug, Clone, Copy)]
struct Corpse {
    lootable: bool,
    skinnable: bool,
}

#[derive(Debug)]
struct State {
    rng: StdRng,
    target: Option<Mob>,
    in_combat: bool,
    pulled: bool,
    corpse: Option<Corpse>,
    durability: u32,
    kills: u32,
}

impl State {
    fn facts(&self) -> FactBase {
        let distance = self.target.map(|mob| mob.distance);
        let corpse = self.corpse;

        FactBase::new()
            .with(Predicate::HasTarget, self.target.is_some())
            .with(Predicate::TargetIsAlive, self.target.is_some_and(|mob| mob.health > 0))
            .with(Predicate::WithinPullRange, distance.is_some_and(|d| d <= PULL_RANGE))
            .with(Predicate::InCombatRange, distance.is_some_and(|d| d <= MELEE_RANGE))
            .with(Predicate::InCombat, self.in_combat)
            .with(Predicate::Pulled, self.pulled)
            .with(Predicate::DangerCombat, false)
            .with(Predicate::ProducedCorpse, corpse.is_some())
            .with(Predicate::ShouldLoot, corpse.is_some_and(|c| c.lootable))
            .with(Predicate::ShouldSkin, corpse.is_some_and(|c| c.skinnable))
            .with(Predicate::ItemsBroken, self.durability == 0)
            .with(Predicate::IsDead, false)
    }

    fn apply(&mut self, name: &str) -> Result<(), ActuationError> {
        match name {
            "find-target" => {
                if self.target.is_none() && self.corpse.is_none() && self.rng.gen_bool(SPAWN_CHANCE) {
                    let mob = Mob {
                        distance: self.rng.gen_range(40.0..80.0),
                        health: self.rng.gen_range(3..=5),
                    };
                    debug!(target: "bot::world", distance = mob.distance, health = mob.health, "target acquired");
                    self.target = Some(mob);
                }
            }
            "move-forward" => {
                if let Some(mob) = self.target.as_mut() {
                    mob.distance = (mob.distance - STEP).max(0.0);
                }
            }
            "pull" => match self.target {
                Some(mob) if mob.distance <= PULL_RANGE && !self.in_combat => {
                    self.in_combat = true;
                    self.pulled = true;
                }
                _ => {}
            },
            "clear-target" => {
                self.target = None;
                self.in_combat = false;
                self.pulled = false;
            }
            "attack" => self.attack(),
            "loot" => {
                if let Some(corpse) = self.corpse.as_mut() {
                    corpse.lootable = false;
                }
                self.drop_consumed_corpse();
            }
            "skin" => {
                if let Some(corpse) = self.corpse.as_mut() {
                    corpse.skinnable = false;
                }
                self.drop_consumed_corpse();
            }
            "wait" => {}
            other => {
                return Err(ActuationError::Unknown {
                    name: other.to_owned(),
                });
            }
        }
        Ok(())
    }

    fn attack(&mut self) {
        if !self.in_combat {
            return;
        }
        let Some(mob) = self.target.as_mut() else {
            return;
        };

        mob.health = mob.health.saturating_sub(1);
        if mob.health > 0 {
            return;
        }

        self.target = None;
        self.in_combat = false;
        self.pulled = false;
        self.kills += 1;
        self.durability = self.durability.saturating_sub(1);
        self.corpse = Some(Corpse {
            lootable: true,
            skinnable: self.rng.gen_bool(0.5),
        });
        debug!(target: "bot::world", kills = self.kills, durability = self.durability, "target died");
    }

    fn drop_consumed_corpse(&mut self) {
        if self
            .corpse
            .is_some_and(|corpse| !corpse.lootable && !corpse.skinnable)
        {
            self.corpse = None;
        }
    }
}

/// Shared simulated world.
#[derive(Clone)]
pub struct World {
    state: Arc<Mutex<State>>,
}

impl World {
    pub fn new(seed: u64, durability: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                rng: StdRng::seed_from_u64(seed),
                target: None,
                in_combat: false,
                pulled: false,
                corpse: None,
                durability,
                kills: 0,
            })),
        }
    }

    pub fn sensor(&self) -> WorldSensor {
        WorldSensor { world: self.clone() }
    }

    pub fn actuator(&self, facts: SharedFacts) -> WorldActuator {
        WorldActuator {
            world: self.clone(),
            facts,
        }
    }

    pub fn kills(&self) -> Result<u32, Poisoned> {
        Ok(self.lock()?.kills)
    }

    pub fn publish(&self, facts: &SharedFacts) -> Result<(), Poisoned> {
        facts.store(&self.lock()?.facts());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, Poisoned> {
        self.state.lock().map_err(|_| Poisoned)
    }
}

pub struct WorldSensor {
    world: World,
}

impl FactSource for WorldSensor {
    fn refresh(&mut self, facts: &SharedFacts) -> Result<(), SensorError> {
        self.world
            .publish(facts)
            .map_err(|error| SensorError::Read(error.to_string()))
    }
}

pub struct WorldActuator {
    world: World,
    facts: SharedFacts,
}

impl Actuator for WorldActuator {
    fn perform(&mut self, actuation: &Actuation) -> Result<(), ActuationError> {
        trace!(target: "bot::world", name = %actuation.name, hold = ?actuation.hold, "actuation");

        let failed = |error: Poisoned| ActuationError::Failed {
            name: actuation.name.to_string(),
            reason: error.to_string(),
        };

        self.world.lock().map_err(failed)?.apply(&actuation.name)?;
        self.world.publish(&self.facts).map_err(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn act(actuator: &mut WorldActuator, name: &'static str) {
        actuator.perform(&Actuation::new(name)).unwrap();
    }

    #[test]
    fn fresh_world_has_nothing_to_do_but_search() {
        let facts = SharedFacts::new();
        World::new(1, 3).publish(&facts).unwrap();

        assert_eq!(facts.get(Predicate::HasTarget), Some(false));
        assert_eq!(facts.get(Predicate::ProducedCorpse), Some(false));
        assert_eq!(facts.get(Predicate::ItemsBroken), Some(false));
    }

    #[test]
    fn full_kill_cycle_leaves_and_consumes_a_corpse() {
        let facts = SharedFacts::new();
        let world = World::new(42, 1);
        let mut actuator = world.actuator(facts.clone());

        while !facts.is_true(Predicate::HasTarget) {
            act(&mut actuator, "find-target");
        }
        while !facts.is_true(Predicate::WithinPullRange) {
            act(&mut actuator, "move-forward");
        }
        act(&mut actuator, "pull");
        assert!(facts.is_true(Predicate::Pulled));

        while facts.is_true(Predicate::TargetIsAlive) {
            act(&mut actuator, "attack");
        }
        assert_eq!(world.kills().unwrap(), 1);
        assert!(facts.is_true(Predicate::ProducedCorpse));
        assert!(facts.is_true(Predicate::ShouldLoot));
        assert!(facts.is_true(Predicate::ItemsBroken));

        act(&mut actuator, "loot");
        act(&mut actuator, "skin");
        assert_eq!(facts.get(Predicate::ProducedCorpse), Some(false));
    }

    #[test]
    fn unknown_actuation_is_rejected() {
        let mut actuator = World::new(0, 1).actuator(SharedFacts::new());
        assert_eq!(
            actuator.perform(&Actuation::new("dance")),
            Err(ActuationError::Unknown {
                name: "dance".into()
            })
        );
    }
}
