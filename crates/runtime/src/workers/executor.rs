//! The execution loop: drives the lifecycle of the current plan head.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use goap_planner::{GoalId, Predicate};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::metrics::ExecutorMetrics;
use crate::agent::{Agent, AgentSnapshot};
use crate::api::{Actuator, GoalError};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, GoalEvent, GoalPhase, LifecycleEvent, panic_message};
use crate::stop::StopSignal;

/// Where the loop is in a goal's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Entering,
    Running,
    Exiting,
}

/// What a single [`Executor::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A stop was requested; nothing was entered or performed.
    Stopped,
    /// The plan was empty; the loop is idle.
    NoRoute,
    Performed(GoalId),
    /// The goal faulted and was forced through `exit`.
    Faulted(GoalId),
}

/// Single-threaded execution loop.
///
/// Every tick: refresh and replan, switch goals if the plan head changed
/// (`exit` the old one, `enter` the new one), then `perform` the head once.
/// Signals emitted during a lifecycle call are delivered before the loop
/// moves on: first to the other goals, then to the agent, then to the loop
/// itself, and finally to bus subscribers.
pub struct Executor {
    agent: Agent,
    actuator: Box<dyn Actuator>,
    bus: EventBus,
    stop: StopSignal,
    config: RuntimeConfig,
    metrics: Arc<ExecutorMetrics>,
    snapshots: watch::Sender<AgentSnapshot>,
    state: LoopState,
    active: Option<GoalId>,
    outbox: Vec<GoalEvent>,
    no_route: bool,
}

impl Executor {
    pub fn new(
        agent: Agent,
        actuator: Box<dyn Actuator>,
        bus: EventBus,
        stop: StopSignal,
        config: RuntimeConfig,
    ) -> Self {
        let (snapshots, _) = watch::channel(AgentSnapshot::default());

        Self {
            agent,
            actuator,
            bus,
            stop,
            config,
            metrics: Arc::new(ExecutorMetrics::new()),
            snapshots,
            state: LoopState::Idle,
            active: None,
            outbox: Vec::new(),
            no_route: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn active_goal(&self) -> Option<GoalId> {
        self.active
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn into_agent(self) -> Agent {
        self.agent
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn metrics(&self) -> Arc<ExecutorMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn watch_snapshots(&self) -> watch::Receiver<AgentSnapshot> {
        self.snapshots.subscribe()
    }

    /// Runs until the stop signal is raised, then exits the active goal.
    ///
    /// Starts by broadcasting `resume = true` to every goal. To run again
    /// after a stop, reset the [`StopSignal`] first.
    pub fn run(&mut self) {
        info!(target: "goap::executor", goals = self.agent.len(), "execution loop started");
        self.bus.publish_lifecycle(LifecycleEvent::Started);
        self.broadcast(GoalEvent::broadcast(Predicate::Resume, true));

        while !self.stop.is_stopped() {
            self.tick();
            self.stop
                .sleep(self.config.tick_interval, self.config.wait_poll_interval);
        }

        self.shutdown();
    }

    /// Delivers a loop-originated signal to every goal and listener.
    pub fn broadcast(&mut self, event: GoalEvent) {
        self.outbox.push(event);
        self.flush_events();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.stop.is_stopped() {
            return TickOutcome::Stopped;
        }
        self.metrics.record_tick();

        let agent = &mut self.agent;
        let next = panic::catch_unwind(AssertUnwindSafe(|| agent.cycle().peek().map(|step| step.goal)))
            .unwrap_or_else(|payload| {
                error!(
                    target: "goap::executor",
                    panic = %panic_message(payload.as_ref()),
                    "planning cycle panicked, idling this tick"
                );
                None
            });
        self.metrics.record_plan();

        let outcome = match next {
            None => {
                self.idle_without_route();
                TickOutcome::NoRoute
            }
            Some(next) => self.advance(next),
        };

        self.publish_snapshot();
        outcome
    }

    /// Exits the active goal (once) and raises the stop signal.
    pub fn shutdown(&mut self) {
        self.stop.stop();
        if let Some(active) = self.active.take() {
            self.exit(active);
        }
        self.state = LoopState::Idle;
        self.publish_snapshot();

        info!(target: "goap::executor", "execution loop stopped");
        self.bus.publish_lifecycle(LifecycleEvent::Stopped);
    }

    fn advance(&mut self, next: GoalId) -> TickOutcome {
        if self.no_route {
            self.no_route = false;
            debug!(target: "goap::executor", "route to objective found again");
        }

        if self.active != Some(next) {
            self.publish_plan();

            if let Some(previous) = self.active.take() {
                self.exit(previous);
            }
            if self.stop.is_stopped() {
                return TickOutcome::Stopped;
            }

            self.state = LoopState::Entering;
            self.metrics.record_enter();
            if let Err(error) = self.invoke(next, GoalPhase::Enter) {
                self.fault(next, GoalPhase::Enter, error);
                return TickOutcome::Faulted(next);
            }

            let goal = self.agent.goal_name(next).to_owned();
            info!(target: "goap::executor", goal = %goal, "entered");
            self.bus
                .publish_lifecycle(LifecycleEvent::Entered { goal });
            self.active = Some(next);
            self.state = LoopState::Running;
        }

        if self.stop.is_stopped() {
            return TickOutcome::Stopped;
        }

        match self.invoke(next, GoalPhase::Perform) {
            Ok(()) => TickOutcome::Performed(next),
            Err(error) => {
                self.fault(next, GoalPhase::Perform, error);
                TickOutcome::Faulted(next)
            }
        }
    }

    fn idle_without_route(&mut self) {
        self.metrics.record_no_route();
        if let Some(active) = self.active.take() {
            self.exit(active);
        }
        self.state = LoopState::Idle;

        if !self.no_route {
            self.no_route = true;
            warn!(
                target: "goap::executor",
                facts = ?self.agent.last_snapshot(),
                "no route to objective"
            );
            self.bus.publish_lifecycle(LifecycleEvent::NoRoute);
        }
    }

    /// Calls one lifecycle method with panics converted into faults, then
    /// delivers whatever the goal emitted.
    fn invoke(&mut self, id: GoalId, phase: GoalPhase) -> Result<(), GoalError> {
        let poll = self.config.wait_poll_interval;
        let lent = self.agent.lend(
            id,
            self.actuator.as_mut(),
            &mut self.outbox,
            &self.stop,
            poll,
        );

        let result = match lent {
            Some((goal, mut ctx)) => panic::catch_unwind(AssertUnwindSafe(|| match phase {
                GoalPhase::Enter => goal.enter(&mut ctx),
                GoalPhase::Perform => goal.perform(&mut ctx),
                GoalPhase::Exit => goal.exit(&mut ctx),
            }))
            .unwrap_or_else(|payload| Err(GoalError::Panicked(panic_message(payload.as_ref())))),
            None => Err(GoalError::failed(format!("no goal registered as {id}"))),
        };

        self.flush_events();
        result
    }

    fn exit(&mut self, id: GoalId) {
        self.state = LoopState::Exiting;
        if let Err(error) = self.invoke(id, GoalPhase::Exit) {
            self.report_fault(id, GoalPhase::Exit, &error);
        }
        self.metrics.record_exit();

        let goal = self.agent.goal_name(id).to_owned();
        info!(target: "goap::executor", goal = %goal, "exited");
        self.bus.publish_lifecycle(LifecycleEvent::Exited { goal });
        self.state = LoopState::Idle;
    }

    /// Reports the fault and forces the goal through `exit`, best-effort.
    fn fault(&mut self, id: GoalId, phase: GoalPhase, error: GoalError) {
        self.report_fault(id, phase, &error);
        self.active = None;
        self.exit(id);
    }

    fn report_fault(&self, id: GoalId, phase: GoalPhase, error: &GoalError) {
        let goal = self.agent.goal_name(id).to_owned();

        if matches!(error, GoalError::Interrupted) {
            info!(target: "goap::executor", goal = %goal, %phase, "interrupted by stop request");
            return;
        }

        error!(
            target: "goap::executor",
            goal = %goal,
            %phase,
            error = %error,
            "goal faulted"
        );
        self.metrics.record_fault();
        self.bus.publish_lifecycle(LifecycleEvent::Fault {
            goal,
            phase,
            error: error.to_string(),
        });
    }

    fn flush_events(&mut self) {
        for event in std::mem::take(&mut self.outbox) {
            let delivered = self.bus.deliver(&event, self.agent.goals_mut());
            self.metrics.record_deliveries(delivered as u64);
            self.agent.on_event(&event);
            self.on_event(&event);
            self.bus.publish(Event::Signal(event));
        }
    }

    /// Loop listener.
    fn on_event(&mut self, event: &GoalEvent) {
        if event.is(Predicate::Abort) && self.config.stop_on_abort {
            let source = event
                .source
                .map_or("loop", |id| self.agent.goal_name(id));
            warn!(target: "goap::executor", source, "abort signalled, stopping");
            self.stop.stop();
        }
    }

    fn publish_plan(&self) {
        let plan = self.agent.plan();
        let steps: Vec<String> = plan.names().into_iter().map(str::to_owned).collect();
        debug!(
            target: "goap::executor",
            steps = ?steps,
            cost = plan.total_cost(),
            "plan head changed"
        );
        self.bus.publish_lifecycle(LifecycleEvent::PlanChanged {
            steps,
            cost: plan.total_cost(),
        });
    }

    fn publish_snapshot(&self) {
        self.snapshots
            .send_replace(self.agent.snapshot(self.active));
    }
}
