//! The grinding goal set.
//!
//! The objective is "a corpse has been produced". With no corpse around the
//! planner chains route → approach → pull → combat; once a corpse exists the
//! objective already holds and the cheapest single goal that keeps it holding
//! runs instead (loot, skin, or bailing out on broken gear).
use std::time::{Duration, Instant};

use goap_planner::{GoalCondition, GoalDescriptor, Predicate};
use goap_runtime::{Goal, GoalContext, GoalError, GoalEvent};
use tracing::{debug, info, warn};

/// Give up on a pull that has not landed after this long.
const PULL_TIMEOUT: Duration = Duration::from_secs(7);
const PULL_CONFIRM: Duration = Duration::from_millis(500);
const CORPSE_CONFIRM: Duration = Duration::from_millis(250);

pub fn objective() -> GoalCondition {
    GoalCondition::new().require(Predicate::ProducedCorpse, true)
}

/// Every goal, in registration (tie-break) order.
pub fn registry(attack_cooldown: Duration) -> Result<Vec<Box<dyn Goal>>, goap_planner::PlannerError> {
    Ok(vec![
        Box::new(ItemsBrokenGoal::new()?),
        Box::new(LootGoal::new()?),
        Box::new(SkinningGoal::new()?),
        Box::new(CombatGoal::new(attack_cooldown)?),
        Box::new(PullTargetGoal::new()?),
        Box::new(ApproachTargetGoal::new()?),
        Box::new(FollowRouteGoal::new()?),
        Box::new(WaitGoal::new(Duration::from_millis(100))?),
    ])
}

type Built<T> = Result<T, goap_planner::PlannerError>;

pub struct FollowRouteGoal {
    descriptor: GoalDescriptor,
    searches: u32,
    aborted: bool,
}

impl FollowRouteGoal {
    pub fn new() -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("follow-route")
                .cost(20.0)
                .requires(Predicate::DangerCombat, false)
                .requires(Predicate::ProducedCorpse, false)
                .requires(Predicate::HasTarget, false)
                .effect(Predicate::HasTarget, true)
                .effect(Predicate::TargetIsAlive, true)
                .build()?,
            searches: 0,
            aborted: false,
        })
    }
}

impl Goal for FollowRouteGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn can_run(&self) -> bool {
        !self.aborted
    }

    fn enter(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        ctx.emit(Predicate::Fighting, false);
        Ok(())
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.searches += 1;
        ctx.act("find-target")
    }

    fn exit(&mut self, _ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        debug!(target: "bot::goals", searches = self.searches, "left route");
        self.searches = 0;
        Ok(())
    }

    fn on_event(&mut self, event: &GoalEvent) {
        if event.is(Predicate::Abort) {
            self.aborted = true;
        } else if event.is(Predicate::Resume) {
            self.aborted = false;
            self.searches = 0;
        }
    }
}

pub struct ApproachTargetGoal {
    descriptor: GoalDescriptor,
}

impl ApproachTargetGoal {
    pub fn new() -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("approach-target")
                .cost(8.0)
                .requires(Predicate::HasTarget, true)
                .requires(Predicate::TargetIsAlive, true)
                .requires(Predicate::WithinPullRange, false)
                .effect(Predicate::WithinPullRange, true)
                .build()?,
        })
    }
}

impl Goal for ApproachTargetGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        ctx.act("move-forward")
    }
}

pub struct PullTargetGoal {
    descriptor: GoalDescriptor,
    pull_start: Instant,
}

impl PullTargetGoal {
    pub fn new() -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("pull-target")
                .cost(7.0)
                .requires(Predicate::TargetIsAlive, true)
                .requires(Predicate::InCombat, false)
                .requires(Predicate::HasTarget, true)
                .requires(Predicate::Pulled, false)
                .requires(Predicate::WithinPullRange, true)
                .effect(Predicate::Pulled, true)
                .build()?,
            pull_start: Instant::now(),
        })
    }
}

impl Goal for PullTargetGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn enter(&mut self, _ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.pull_start = Instant::now();
        Ok(())
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        if self.pull_start.elapsed() > PULL_TIMEOUT {
            warn!(target: "bot::goals", "pull took too long, dropping target");
            ctx.act("clear-target")?;
            self.pull_start = Instant::now();
            return Ok(());
        }

        ctx.emit(Predicate::Fighting, true);
        ctx.act("pull")?;

        if ctx.wait_for(Predicate::Pulled, true, PULL_CONFIRM)? {
            ctx.emit(Predicate::Pulled, true);
        }
        Ok(())
    }

    fn on_event(&mut self, event: &GoalEvent) {
        if event.is(Predicate::Resume) {
            self.pull_start = Instant::now();
        }
    }
}

pub struct CombatGoal {
    descriptor: GoalDescriptor,
    attack_cooldown: Duration,
    kill_recorded: bool,
}

impl CombatGoal {
    pub fn new(attack_cooldown: Duration) -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("combat")
                .cost(4.0)
                .requires(Predicate::Pulled, true)
                .requires(Predicate::TargetIsAlive, true)
                .effect(Predicate::TargetIsAlive, false)
                .effect(Predicate::ProducedCorpse, true)
                .build()?,
            attack_cooldown,
            kill_recorded: false,
        })
    }
}

impl Goal for CombatGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn enter(&mut self, _ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.kill_recorded = false;
        Ok(())
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        if !ctx.cooldown_ready("attack", self.attack_cooldown) {
            return Ok(());
        }
        ctx.act("attack")?;
        ctx.start_cooldown("attack");

        if !self.kill_recorded && ctx.facts().get(Predicate::TargetIsAlive) == Some(false) {
            self.kill_recorded = true;
            ctx.state_mut().record_kill();
            ctx.emit(Predicate::Fighting, false);
            info!(target: "bot::goals", kills = ctx.state().kills(), "target killed");
        }
        Ok(())
    }
}

/// Shared perform of loot and skin: act, then settle corpse accounting once
/// the corpse is gone.
fn consume(ctx: &mut GoalContext<'_>, actuation: &'static str, cleared: Predicate) -> Result<(), GoalError> {
    ctx.act(actuation)?;
    ctx.expect_within(actuation, CORPSE_CONFIRM, |facts| facts.holds(cleared, false))?;

    if ctx.facts().get(Predicate::ProducedCorpse) == Some(false) && ctx.state_mut().consume_corpse() {
        debug!(
            target: "bot::goals",
            remaining = ctx.state().consumable_corpses(),
            "corpse consumed"
        );
    }
    Ok(())
}

pub struct LootGoal {
    descriptor: GoalDescriptor,
}

impl LootGoal {
    pub fn new() -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("loot")
                .cost(4.4)
                .requires(Predicate::ShouldLoot, true)
                .requires(Predicate::InCombat, false)
                .effect(Predicate::ShouldLoot, false)
                .build()?,
        })
    }
}

impl Goal for LootGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        consume(ctx, "loot", Predicate::ShouldLoot)
    }
}

pub struct SkinningGoal {
    descriptor: GoalDescriptor,
}

impl SkinningGoal {
    pub fn new() -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("skinning")
                .cost(4.6)
                .requires(Predicate::DangerCombat, false)
                .requires(Predicate::ShouldSkin, true)
                .effect(Predicate::ShouldSkin, false)
                .build()?,
        })
    }
}

impl Goal for SkinningGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        consume(ctx, "skin", Predicate::ShouldSkin)
    }
}

/// Bails out when gear is broken: announces `abort` to everyone.
pub struct ItemsBrokenGoal {
    descriptor: GoalDescriptor,
}

impl ItemsBrokenGoal {
    pub fn new() -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("items-broken")
                .cost(0.0)
                .requires(Predicate::ItemsBroken, true)
                .build()?,
        })
    }
}

impl Goal for ItemsBrokenGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        warn!(target: "bot::goals", "items are broken");
        ctx.emit(Predicate::Abort, true);
        Ok(())
    }
}

pub struct WaitGoal {
    descriptor: GoalDescriptor,
    period: Duration,
}

impl WaitGoal {
    pub fn new(period: Duration) -> Built<Self> {
        Ok(Self {
            descriptor: GoalDescriptor::builder("wait").cost(30.0).build()?,
            period,
        })
    }
}

impl Goal for WaitGoal {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        ctx.act("wait")?;
        ctx.pause(self.period)
    }
}
