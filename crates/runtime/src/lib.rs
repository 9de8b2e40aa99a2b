//! Runtime half of the GOAP decision core.
//!
//! This crate turns a registry of goals into a running agent: it re-plans
//! every tick against live world facts, drives the lifecycle of the goal at
//! the head of the plan, and mediates the signals goals use to coordinate.
//! Consumers embed [`Runtime`] and supervise it through [`RuntimeHandle`],
//! or drive an [`Executor`] by hand.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes errors, the handle and the sensor/actuator boundaries
//! - [`agent`] owns the goals and the planning cycle
//! - [`goal`] defines the goal contract and what goals may touch
//! - [`events`] carries goal signals and lifecycle transitions
//! - [`workers`] runs the execution loop and the sensor refresh
pub mod agent;
pub mod api;
pub mod config;
pub mod events;
pub mod facts;
pub mod goal;
pub mod runtime;
pub mod stop;
pub mod workers;

pub use agent::{Agent, AgentSnapshot, AgentState, GoalStatus, PreconditionState};
pub use api::{
    Actuation, ActuationError, Actuator, FactSource, GoalError, NullActuator, Result,
    RuntimeError, RuntimeHandle, SensorError,
};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, GoalEvent, GoalPhase, LifecycleEvent, Topic};
pub use facts::SharedFacts;
pub use goal::{CooldownRegistry, Goal, GoalContext};
pub use runtime::{Runtime, RuntimeBuilder};
pub use stop::StopSignal;
pub use workers::{Executor, ExecutorMetrics, LoopState, MetricsSnapshot, TickOutcome};

pub use goap_planner as planner;
