//! Goal registry, objective and planning cycle.

mod state;

pub use state::{AgentSnapshot, AgentState, GoalStatus, PreconditionState};

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use goap_planner::{
    Effect, FactBase, GoalCondition, GoalId, Plan, Plannable, Planner, Precondition, validate_cost,
};
use tracing::{debug, error, warn};

use crate::api::{Actuator, Result, RuntimeError};
use crate::events::{GoalEvent, panic_message};
use crate::facts::SharedFacts;
use crate::goal::{CooldownRegistry, Goal, GoalContext};
use crate::stop::StopSignal;

/// Owns the goals and decides, every cycle, which chain of them to run.
///
/// The registry is fixed at construction; goals are identified by their
/// registration index. Planning is full every cycle, nothing is reused
/// from the previous plan.
pub struct Agent {
    goals: Vec<Box<dyn Goal>>,
    objective: GoalCondition,
    facts: SharedFacts,
    state: AgentState,
    cooldowns: CooldownRegistry,
    statuses: Vec<GoalStatus>,
    snapshot: FactBase,
    plan: Plan,
}

impl Agent {
    /// Validates and takes ownership of the goals.
    pub fn new(
        goals: Vec<Box<dyn Goal>>,
        objective: GoalCondition,
        facts: SharedFacts,
    ) -> Result<Self> {
        if goals.is_empty() {
            return Err(RuntimeError::NoGoals);
        }
        if objective.is_empty() {
            return Err(RuntimeError::EmptyObjective);
        }

        let mut names = HashSet::with_capacity(goals.len());
        for goal in &goals {
            if !names.insert(goal.name()) {
                return Err(RuntimeError::DuplicateGoal {
                    name: goal.name().to_owned(),
                });
            }
            validate_cost(goal.name(), goal.cost())?;
        }

        Ok(Self {
            goals,
            objective,
            facts,
            state: AgentState::default(),
            cooldowns: CooldownRegistry::default(),
            statuses: Vec::new(),
            snapshot: FactBase::new(),
            plan: Plan::empty(),
        })
    }

    /// Captures the live facts and recomputes every goal's status.
    ///
    /// `can_run` and `cost` are read here once per goal; [`replan`](Self::replan)
    /// uses exactly these values. A goal whose gate or cost panics, or whose
    /// cost is negative or not finite, is inadmissible for this cycle.
    pub fn refresh_state(&mut self) -> &[GoalStatus] {
        self.snapshot = self.facts.snapshot();

        let snapshot = &self.snapshot;
        self.statuses = self
            .goals
            .iter()
            .enumerate()
            .map(|(index, goal)| {
                let (admissible, cost) = sample_gate(goal.as_ref());
                GoalStatus {
                    id: GoalId(index),
                    name: goal.name().to_owned(),
                    cost,
                    admissible,
                    preconditions: goal
                        .descriptor()
                        .preconditions()
                        .iter()
                        .map(|precondition| PreconditionState {
                            description: precondition.description.clone(),
                            satisfied: precondition.is_met_by(snapshot),
                        })
                        .collect(),
                }
            })
            .collect();

        &self.statuses
    }

    /// Plans against the facts and statuses captured by the last
    /// [`refresh_state`](Self::refresh_state).
    ///
    /// Inadmissible goals are invisible to the planner.
    pub fn replan(&mut self) -> &Plan {
        let usable: Vec<(GoalId, PlanningView<'_>)> = self
            .statuses
            .iter()
            .filter(|status| status.admissible)
            .filter_map(|status| {
                let goal = self.goals.get(status.id.index())?;
                Some((
                    status.id,
                    PlanningView {
                        goal: goal.as_ref(),
                        cost: status.cost,
                    },
                ))
            })
            .collect();
        let usable: Vec<(GoalId, &PlanningView<'_>)> =
            usable.iter().map(|(id, view)| (*id, view)).collect();

        self.plan = Planner::plan(&usable, &self.snapshot, &self.objective);

        debug!(
            target: "goap::agent",
            usable = usable.len(),
            steps = ?self.plan.names(),
            cost = self.plan.total_cost(),
            "replanned"
        );

        &self.plan
    }

    /// One full planning cycle: refresh, then replan.
    pub fn cycle(&mut self) -> &Plan {
        self.refresh_state();
        self.replan()
    }

    /// Agent listener: remembers the last value of every signal.
    pub fn on_event(&mut self, event: &GoalEvent) {
        self.state.record_signal(event.predicate, event.value);
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn statuses(&self) -> &[GoalStatus] {
        &self.statuses
    }

    pub fn objective(&self) -> &GoalCondition {
        &self.objective
    }

    pub fn facts(&self) -> &SharedFacts {
        &self.facts
    }

    /// Facts captured by the last refresh.
    pub fn last_snapshot(&self) -> &FactBase {
        &self.snapshot
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn goal(&self, id: GoalId) -> Option<&dyn Goal> {
        self.goals.get(id.index()).map(|goal| goal.as_ref())
    }

    pub fn goal_id(&self, name: &str) -> Option<GoalId> {
        self.goals
            .iter()
            .position(|goal| goal.name() == name)
            .map(GoalId)
    }

    pub fn goal_name(&self, id: GoalId) -> &str {
        self.goal(id).map_or("<unknown>", |goal| goal.name())
    }

    pub fn snapshot(&self, active: Option<GoalId>) -> AgentSnapshot {
        AgentSnapshot {
            active: active.map(|id| self.goal_name(id).to_owned()),
            plan: self.plan.names().into_iter().map(str::to_owned).collect(),
            plan_cost: self.plan.total_cost(),
            facts: self.snapshot,
            goals: self.statuses.clone(),
            state: self.state.clone(),
        }
    }

    pub(crate) fn goals_mut(&mut self) -> &mut [Box<dyn Goal>] {
        &mut self.goals
    }

    /// Splits the agent into one goal and the context its lifecycle call sees.
    pub(crate) fn lend<'a>(
        &'a mut self,
        id: GoalId,
        actuator: &'a mut dyn Actuator,
        outbox: &'a mut Vec<GoalEvent>,
        stop: &'a StopSignal,
        poll: Duration,
    ) -> Option<(&'a mut dyn Goal, GoalContext<'a>)> {
        let goal = self.goals.get_mut(id.index())?;
        let ctx = GoalContext::new(
            id,
            self.snapshot,
            &self.facts,
            &mut self.state,
            &mut self.cooldowns,
            actuator,
            outbox,
            stop,
            poll,
        );
        Some((goal.as_mut(), ctx))
    }
}

/// How the planner sees a goal: cost as sampled by the last refresh.
struct PlanningView<'g> {
    goal: &'g dyn Goal,
    cost: f32,
}

impl Plannable for PlanningView<'_> {
    fn name(&self) -> &str {
        self.goal.name()
    }

    fn cost(&self) -> f32 {
        self.cost
    }

    fn preconditions(&self) -> &[Precondition] {
        self.goal.descriptor().preconditions()
    }

    fn effects(&self) -> &[Effect] {
        self.goal.descriptor().effects()
    }
}

/// Reads a goal's gate and cost once, isolating panics.
fn sample_gate(goal: &dyn Goal) -> (bool, f32) {
    match panic::catch_unwind(AssertUnwindSafe(|| (goal.can_run(), goal.cost()))) {
        Ok((admissible, cost)) => match validate_cost(goal.name(), cost) {
            Ok(cost) => (admissible, cost),
            Err(err) => {
                warn!(target: "goap::agent", goal = goal.name(), error = %err, "goal skipped this cycle");
                (false, cost)
            }
        },
        Err(payload) => {
            error!(
                target: "goap::agent",
                goal = goal.name(),
                panic = %panic_message(payload.as_ref()),
                "admissibility check panicked, goal skipped this cycle"
            );
            (false, goal.descriptor().cost())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GoalError;
    use goap_planner::{GoalDescriptor, Predicate};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct Step {
        descriptor: GoalDescriptor,
        gate: Arc<AtomicBool>,
    }

    impl Step {
        fn boxed(descriptor: GoalDescriptor) -> Box<dyn Goal> {
            Box::new(Self {
                descriptor,
                gate: Arc::new(AtomicBool::new(true)),
            })
        }
    }

    impl Goal for Step {
        fn descriptor(&self) -> &GoalDescriptor {
            &self.descriptor
        }

        fn can_run(&self) -> bool {
            self.gate.load(Ordering::SeqCst)
        }

        fn perform(&mut self, _ctx: &mut GoalContext<'_>) -> std::result::Result<(), GoalError> {
            Ok(())
        }
    }

    fn pull() -> GoalDescriptor {
        GoalDescriptor::builder("pull")
            .requires(Predicate::HasTarget, true)
            .effect(Predicate::Pulled, true)
            .build()
            .unwrap()
    }

    fn combat() -> GoalDescriptor {
        GoalDescriptor::builder("combat")
            .requires(Predicate::Pulled, true)
            .effect(Predicate::Fighting, true)
            .build()
            .unwrap()
    }

    fn objective() -> GoalCondition {
        GoalCondition::new().require(Predicate::Fighting, true)
    }

    #[test]
    fn rejects_invalid_registries() {
        let facts = SharedFacts::new();
        assert!(matches!(
            Agent::new(Vec::new(), objective(), facts.clone()),
            Err(RuntimeError::NoGoals)
        ));
        assert!(matches!(
            Agent::new(vec![Step::boxed(pull())], GoalCondition::new(), facts.clone()),
            Err(RuntimeError::EmptyObjective)
        ));
        assert!(matches!(
            Agent::new(vec![Step::boxed(pull()), Step::boxed(pull())], objective(), facts),
            Err(RuntimeError::DuplicateGoal { name }) if name == "pull"
        ));
    }

    #[test]
    fn cycle_plans_from_live_facts() {
        let facts = SharedFacts::new();
        let mut agent = Agent::new(
            vec![Step::boxed(combat()), Step::boxed(pull())],
            objective(),
            facts.clone(),
        )
        .unwrap();

        assert!(agent.cycle().is_empty());

        facts.set(Predicate::HasTarget, true);
        let plan = agent.cycle();
        assert_eq!(plan.names(), ["pull", "combat"]);
        assert_eq!(plan.total_cost(), 2.0);
        assert_eq!(agent.goal_id("pull"), Some(GoalId(1)));
    }

    #[test]
    fn refresh_reports_precondition_states() {
        let facts = SharedFacts::new();
        facts.set(Predicate::HasTarget, true);
        let mut agent =
            Agent::new(vec![Step::boxed(pull()), Step::boxed(combat())], objective(), facts)
                .unwrap();

        let statuses = agent.refresh_state();
        assert!(statuses[0].is_ready());
        assert!(!statuses[1].is_ready());
        assert_eq!(statuses[1].unmet().collect::<Vec<_>>(), ["pulled"]);
    }

    #[test]
    fn inadmissible_goal_is_invisible_to_planner() {
        let facts = SharedFacts::new();
        facts.set(Predicate::HasTarget, true);
        let gate = Arc::new(AtomicBool::new(false));
        let gated = Box::new(Step {
            descriptor: pull(),
            gate: Arc::clone(&gate),
        });
        let mut agent = Agent::new(vec![gated, Step::boxed(combat())], objective(), facts).unwrap();

        assert!(agent.cycle().is_empty());
        assert!(!agent.statuses()[0].admissible);

        gate.store(true, Ordering::SeqCst);
        assert_eq!(agent.cycle().len(), 2);
    }

    #[test]
    fn agent_listener_records_signals() {
        let mut agent =
            Agent::new(vec![Step::boxed(pull())], objective(), SharedFacts::new()).unwrap();
        agent.on_event(&GoalEvent::from_goal(GoalId(0), Predicate::Pulled, true));
        assert_eq!(agent.state().signal(Predicate::Pulled), Some(true));
        assert_eq!(agent.state().signal(Predicate::Fighting), None);
    }

    /// Flips its gate and raises its cost on every read.
    struct Fickle {
        descriptor: GoalDescriptor,
        gate_reads: Arc<AtomicU32>,
        cost_reads: Arc<AtomicU32>,
        panics: bool,
    }

    impl Fickle {
        fn new(descriptor: GoalDescriptor) -> Self {
            Self {
                descriptor,
                gate_reads: Arc::default(),
                cost_reads: Arc::default(),
                panics: false,
            }
        }
    }

    impl Goal for Fickle {
        fn descriptor(&self) -> &GoalDescriptor {
            &self.descriptor
        }

        fn can_run(&self) -> bool {
            if self.panics {
                panic!("{} gate blew up", self.descriptor.name());
            }
            self.gate_reads.fetch_add(1, Ordering::SeqCst) % 2 == 0
        }

        fn cost(&self) -> f32 {
            (self.cost_reads.fetch_add(1, Ordering::SeqCst) + 1) as f32
        }

        fn perform(&mut self, _ctx: &mut GoalContext<'_>) -> std::result::Result<(), GoalError> {
            Ok(())
        }
    }

    #[test]
    fn plan_uses_the_gate_and_cost_sampled_by_refresh() {
        let facts = SharedFacts::new();
        facts.set(Predicate::HasTarget, true);
        let fickle = Fickle::new(pull());
        let gate_reads = Arc::clone(&fickle.gate_reads);
        let cost_reads = Arc::clone(&fickle.cost_reads);
        let mut agent =
            Agent::new(vec![Box::new(fickle), Step::boxed(combat())], objective(), facts).unwrap();
        assert_eq!(cost_reads.load(Ordering::SeqCst), 1);

        for cycle in 1..=4u32 {
            agent.cycle();
            assert_eq!(gate_reads.load(Ordering::SeqCst), cycle);
            assert_eq!(cost_reads.load(Ordering::SeqCst), cycle + 1);

            let status = &agent.statuses()[0];
            assert_eq!(status.cost, (cycle + 1) as f32);
            if status.admissible {
                assert_eq!(agent.plan().names(), ["pull", "combat"]);
                assert_eq!(agent.plan().total_cost(), status.cost + 1.0);
            } else {
                assert!(agent.plan().is_empty());
            }
        }
    }

    #[test]
    fn panicking_gate_makes_the_goal_inadmissible() {
        let facts = SharedFacts::new();
        facts.set(Predicate::HasTarget, true);
        let mut broken = Fickle::new(pull());
        broken.panics = true;
        let shortcut = GoalDescriptor::builder("shortcut")
            .cost(5.0)
            .effect(Predicate::Pulled, true)
            .build()
            .unwrap();
        let mut agent = Agent::new(
            vec![Box::new(broken), Step::boxed(shortcut), Step::boxed(combat())],
            objective(),
            facts,
        )
        .unwrap();

        let plan = agent.cycle();
        assert_eq!(plan.names(), ["shortcut", "combat"]);
        assert!(!agent.statuses()[0].admissible);
        assert_eq!(agent.statuses()[0].cost, 1.0);
        assert!(agent.statuses()[1].admissible);
    }
}
