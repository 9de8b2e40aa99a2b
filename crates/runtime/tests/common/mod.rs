//! Scripted goals shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use goap_runtime::planner::{GoalCondition, GoalDescriptor, Predicate};
use goap_runtime::{Goal, GoalContext, GoalError, GoalEvent, RuntimeConfig};

/// Ordered record of every lifecycle call and delivered signal.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// What a scripted lifecycle call does.
#[derive(Clone, Copy, Debug)]
pub enum Step {
    Ok,
    Fail,
    Panic,
    Emit(Predicate, bool),
    /// Writes straight into the shared world facts.
    Set(Predicate, bool),
    /// Sleeps, interruptibly.
    Pause(Duration),
}

pub struct Probe {
    descriptor: GoalDescriptor,
    journal: Journal,
    on_enter: Step,
    on_perform: Step,
    on_exit: Step,
    gate: Option<Arc<AtomicBool>>,
    panicking_gate: bool,
    panicking_listener: bool,
}

impl Probe {
    pub fn new(descriptor: GoalDescriptor, journal: &Journal) -> Self {
        Self {
            descriptor,
            journal: journal.clone(),
            on_enter: Step::Ok,
            on_perform: Step::Ok,
            on_exit: Step::Ok,
            gate: None,
            panicking_gate: false,
            panicking_listener: false,
        }
    }

    pub fn on_enter(mut self, step: Step) -> Self {
        self.on_enter = step;
        self
    }

    pub fn on_perform(mut self, step: Step) -> Self {
        self.on_perform = step;
        self
    }

    pub fn on_exit(mut self, step: Step) -> Self {
        self.on_exit = step;
        self
    }

    /// Admissible only while `gate` reads `true`.
    pub fn gated(mut self, gate: Arc<AtomicBool>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// `can_run` panics on every call.
    pub fn panicking_gate(mut self) -> Self {
        self.panicking_gate = true;
        self
    }

    pub fn panicking_listener(mut self) -> Self {
        self.panicking_listener = true;
        self
    }

    fn run(&self, phase: &str, step: Step, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.journal.push(format!("{phase}:{}", self.descriptor.name()));
        match step {
            Step::Ok => Ok(()),
            Step::Fail => Err(GoalError::failed(format!("{} refused", self.descriptor.name()))),
            Step::Panic => panic!("{} blew up", self.descriptor.name()),
            Step::Emit(predicate, value) => {
                ctx.emit(predicate, value);
                Ok(())
            }
            Step::Set(predicate, value) => {
                ctx.facts().set(predicate, value);
                Ok(())
            }
            Step::Pause(duration) => ctx.pause(duration),
        }
    }
}

impl Goal for Probe {
    fn descriptor(&self) -> &GoalDescriptor {
        &self.descriptor
    }

    fn can_run(&self) -> bool {
        if self.panicking_gate {
            panic!("gate {} blew up", self.descriptor.name());
        }
        self.gate
            .as_ref()
            .is_none_or(|gate| gate.load(Ordering::SeqCst))
    }

    fn enter(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.run("enter", self.on_enter, ctx)
    }

    fn perform(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.run("perform", self.on_perform, ctx)
    }

    fn exit(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        self.run("exit", self.on_exit, ctx)
    }

    fn on_event(&mut self, event: &GoalEvent) {
        if self.panicking_listener {
            panic!("listener {} blew up", self.descriptor.name());
        }
        let origin = if event.source.is_some() { "goal" } else { "loop" };
        self.journal
            .push(format!("event:{}:{event}:{origin}", self.descriptor.name()));
    }
}

pub fn objective() -> GoalCondition {
    GoalCondition::new().require(Predicate::ProducedCorpse, true)
}

/// `has-target = false` → `has-target = true`.
pub fn find(cost: f32) -> GoalDescriptor {
    GoalDescriptor::builder("find")
        .cost(cost)
        .requires(Predicate::HasTarget, false)
        .effect(Predicate::HasTarget, true)
        .build()
        .unwrap()
}

/// `has-target = true` → `produced-corpse = true`.
pub fn kill(cost: f32) -> GoalDescriptor {
    GoalDescriptor::builder("kill")
        .cost(cost)
        .requires(Predicate::HasTarget, true)
        .effect(Predicate::ProducedCorpse, true)
        .build()
        .unwrap()
}

/// Reaches the objective in one step from anywhere.
pub fn shortcut(name: &str, cost: f32) -> GoalDescriptor {
    GoalDescriptor::builder(name)
        .cost(cost)
        .effect(Predicate::ProducedCorpse, true)
        .build()
        .unwrap()
}

pub fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        tick_interval: Duration::from_millis(1),
        fact_refresh_interval: Duration::from_millis(1),
        wait_poll_interval: Duration::from_millis(1),
        ..RuntimeConfig::default()
    }
}
