//! High-level runtime orchestrator.
//!
//! The runtime owns the execution loop and the sensor worker, wires up the
//! shared facts and the event bus, and exposes a builder-based API.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use goap_planner::GoalCondition;

use crate::agent::Agent;
use crate::api::{Actuator, FactSource, NullActuator, Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::facts::SharedFacts;
use crate::goal::Goal;
use crate::stop::StopSignal;
use crate::workers::{Executor, SensorWorker};

/// A running agent.
///
/// The execution loop lives on a dedicated blocking thread, the sensor
/// worker on a tokio task. [`RuntimeHandle`] is the cloneable façade for
/// supervisors.
pub struct Runtime {
    handle: RuntimeHandle,
    executor_handle: JoinHandle<Agent>,
    sensor_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// `true` once the execution loop has returned.
    pub fn is_finished(&self) -> bool {
        self.executor_handle.is_finished()
    }

    /// Stops the loop and joins both workers. Returns the agent so callers
    /// can inspect its final state.
    pub async fn shutdown(self) -> Result<Agent> {
        self.handle.stop();
        self.join().await
    }

    /// Waits for the loop to stop on its own (abort signal or a stop from
    /// another handle), then joins the sensor worker.
    pub async fn wait(self) -> Result<Agent> {
        self.join().await
    }

    async fn join(self) -> Result<Agent> {
        let Runtime {
            handle,
            executor_handle,
            sensor_handle,
        } = self;

        let joined = executor_handle.await;
        // the sensor only exits on the stop flag, also when the loop died
        handle.stop();

        if let Some(sensor_handle) = sensor_handle {
            if joined.is_err() {
                sensor_handle.abort();
            }
            match sensor_handle.await {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => return Err(RuntimeError::WorkerJoin(err)),
            }
        }

        joined.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    goals: Vec<Box<dyn Goal>>,
    objective: GoalCondition,
    facts: Option<SharedFacts>,
    actuator: Option<Box<dyn Actuator>>,
    fact_source: Option<Box<dyn FactSource>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            goals: Vec::new(),
            objective: GoalCondition::new(),
            facts: None,
            actuator: None,
            fact_source: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a goal. Registration order is the planner's tie-break order.
    pub fn goal(mut self, goal: impl Goal + 'static) -> Self {
        self.goals.push(Box::new(goal));
        self
    }

    pub fn boxed_goals(mut self, goals: impl IntoIterator<Item = Box<dyn Goal>>) -> Self {
        self.goals.extend(goals);
        self
    }

    pub fn objective(mut self, objective: GoalCondition) -> Self {
        self.objective = objective;
        self
    }

    /// Share an existing fact store instead of starting from an empty one.
    pub fn facts(mut self, facts: SharedFacts) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Defaults to [`NullActuator`].
    pub fn actuator(mut self, actuator: impl Actuator + 'static) -> Self {
        self.actuator = Some(Box::new(actuator));
        self
    }

    /// Polled by the sensor worker every `fact_refresh_interval`.
    pub fn fact_source(mut self, source: impl FactSource) -> Self {
        self.fact_source = Some(Box::new(source));
        self
    }

    /// Validates the configuration and returns an executor to be driven by
    /// hand, tick by tick. The fact source, if any, is not polled.
    pub fn build_executor(self) -> Result<Executor> {
        let (executor, _) = self.assemble()?;
        Ok(executor)
    }

    /// Validates the configuration and starts the workers.
    pub async fn build(self) -> Result<Runtime> {
        let (mut executor, fact_source) = self.assemble()?;

        let metrics = executor.metrics();
        let stop = executor.stop_signal().clone();
        let facts = executor.agent().facts().clone();

        let handle = RuntimeHandle::new(
            stop.clone(),
            executor.bus().clone(),
            facts.clone(),
            executor.watch_snapshots(),
            Arc::clone(&metrics),
        );

        let refresh_interval = executor.config().fact_refresh_interval;
        let sensor_handle = fact_source.map(|source| {
            let worker = SensorWorker::new(source, facts, refresh_interval, stop, metrics);
            tokio::spawn(worker.run())
        });

        let executor_handle = tokio::task::spawn_blocking(move || {
            executor.run();
            executor.into_agent()
        });

        debug!(target: "goap::executor", sensor = sensor_handle.is_some(), "runtime started");

        Ok(Runtime {
            handle,
            executor_handle,
            sensor_handle,
        })
    }

    fn assemble(self) -> Result<(Executor, Option<Box<dyn FactSource>>)> {
        let facts = self.facts.unwrap_or_default();
        let agent = Agent::new(self.goals, self.objective, facts)?;
        let actuator: Box<dyn Actuator> = match self.actuator {
            Some(actuator) => actuator,
            None => Box::new(NullActuator),
        };

        let executor = Executor::new(
            agent,
            actuator,
            EventBus::with_capacity(self.config.event_buffer_size),
            StopSignal::new(),
            self.config,
        );

        Ok((executor, self.fact_source))
    }
}
