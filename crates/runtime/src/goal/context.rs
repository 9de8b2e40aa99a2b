use std::borrow::Cow;
use std::time::{Duration, Instant};

use goap_planner::{FactBase, GoalId, Predicate};
use tracing::trace;

use crate::agent::AgentState;
use crate::api::{Actuation, Actuator, GoalError};
use crate::events::GoalEvent;
use crate::facts::SharedFacts;
use crate::stop::StopSignal;

use super::CooldownRegistry;

/// Everything a goal may touch during `enter`, `perform` or `exit`.
///
/// Signals emitted here are queued and delivered, in emission order, as soon
/// as the lifecycle call returns.
pub struct GoalContext<'a> {
    goal: GoalId,
    snapshot: FactBase,
    facts: &'a SharedFacts,
    state: &'a mut AgentState,
    cooldowns: &'a mut CooldownRegistry,
    actuator: &'a mut dyn Actuator,
    outbox: &'a mut Vec<GoalEvent>,
    stop: &'a StopSignal,
    poll: Duration,
}

impl<'a> GoalContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        goal: GoalId,
        snapshot: FactBase,
        facts: &'a SharedFacts,
        state: &'a mut AgentState,
        cooldowns: &'a mut CooldownRegistry,
        actuator: &'a mut dyn Actuator,
        outbox: &'a mut Vec<GoalEvent>,
        stop: &'a StopSignal,
        poll: Duration,
    ) -> Self {
        Self {
            goal,
            snapshot,
            facts,
            state,
            cooldowns,
            actuator,
            outbox,
            stop,
            poll,
        }
    }

    pub fn goal_id(&self) -> GoalId {
        self.goal
    }

    /// Facts the current plan was built from.
    pub fn snapshot(&self) -> &FactBase {
        &self.snapshot
    }

    /// Live facts, possibly newer than [`snapshot`](Self::snapshot).
    pub fn facts(&self) -> &SharedFacts {
        self.facts
    }

    pub fn state(&self) -> &AgentState {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut *self.state
    }

    /// Queues `(predicate, value)` for every other goal.
    pub fn emit(&mut self, predicate: Predicate, value: bool) {
        trace!(target: "goap::events", goal = %self.goal, %predicate, value, "emit");
        self.outbox
            .push(GoalEvent::from_goal(self.goal, predicate, value));
    }

    pub fn act(&mut self, name: impl Into<Cow<'static, str>>) -> Result<(), GoalError> {
        self.perform(&Actuation::new(name))
    }

    pub fn act_held(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        hold: Duration,
    ) -> Result<(), GoalError> {
        self.perform(&Actuation::held(name, hold))
    }

    pub fn perform(&mut self, actuation: &Actuation) -> Result<(), GoalError> {
        self.actuator.perform(actuation)?;
        Ok(())
    }

    /// `true` if this goal has not used `key` within the last `period`.
    pub fn cooldown_ready(&self, key: &str, period: Duration) -> bool {
        self.cooldowns
            .is_ready(self.goal, key, period, Instant::now())
    }

    pub fn start_cooldown(&mut self, key: &str) {
        self.cooldowns.mark(self.goal, key, Instant::now());
    }

    pub fn since_used(&self, key: &str) -> Option<Duration> {
        self.cooldowns
            .last_used(self.goal, key)
            .map(|at| at.elapsed())
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Polls the live facts until `condition` holds or `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout and [`GoalError::Interrupted`] once a
    /// stop has been requested.
    pub fn wait_until(
        &mut self,
        timeout: Duration,
        mut condition: impl FnMut(&FactBase) -> bool,
    ) -> Result<bool, GoalError> {
        let deadline = Instant::now() + timeout;

        loop {
            if condition(&self.facts.snapshot()) {
                return Ok(true);
            }
            if self.stop.is_stopped() {
                return Err(GoalError::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(self.poll.max(Duration::from_millis(1)).min(deadline - now));
        }
    }

    /// Waits for `predicate` to read `value` in the live facts.
    pub fn wait_for(
        &mut self,
        predicate: Predicate,
        value: bool,
        timeout: Duration,
    ) -> Result<bool, GoalError> {
        self.wait_until(timeout, |facts| facts.holds(predicate, value))
    }

    /// Like [`wait_until`](Self::wait_until), but a timeout is an error.
    pub fn expect_within(
        &mut self,
        what: &str,
        timeout: Duration,
        condition: impl FnMut(&FactBase) -> bool,
    ) -> Result<(), GoalError> {
        if self.wait_until(timeout, condition)? {
            Ok(())
        } else {
            Err(GoalError::Timeout {
                what: what.to_owned(),
                after: timeout,
            })
        }
    }

    /// Sleeps for `duration` unless a stop is requested first.
    pub fn pause(&self, duration: Duration) -> Result<(), GoalError> {
        if self.stop.sleep(duration, self.poll) {
            Ok(())
        } else {
            Err(GoalError::Interrupted)
        }
    }
}
