//! Cloneable façade for supervising a running agent.
//!
//! [`RuntimeHandle`] lets any thread or task stop the loop, observe the
//! active goal and plan, write facts, and stream events from specific topics.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::agent::AgentSnapshot;
use crate::events::{Event, EventBus, Topic};
use crate::facts::SharedFacts;
use crate::stop::StopSignal;
use crate::workers::{ExecutorMetrics, MetricsSnapshot};

#[derive(Clone)]
pub struct RuntimeHandle {
    stop: StopSignal,
    event_bus: EventBus,
    facts: SharedFacts,
    snapshots: watch::Receiver<AgentSnapshot>,
    metrics: Arc<ExecutorMetrics>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        stop: StopSignal,
        event_bus: EventBus,
        facts: SharedFacts,
        snapshots: watch::Receiver<AgentSnapshot>,
        metrics: Arc<ExecutorMetrics>,
    ) -> Self {
        Self {
            stop,
            event_bus,
            facts,
            snapshots,
            metrics,
        }
    }

    /// Requests a stop. The loop exits the active goal and terminates; no
    /// goal is entered or performed afterwards.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// `false` once a stop was requested, by a supervisor or by an abort
    /// signal.
    pub fn is_running(&self) -> bool {
        !self.stop.is_stopped()
    }

    /// Name of the goal currently being performed.
    pub fn active_goal(&self) -> Option<String> {
        self.snapshots.borrow().active.clone()
    }

    /// Latest agent snapshot, refreshed every tick.
    pub fn snapshot(&self) -> AgentSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every new snapshot.
    pub fn watch_snapshots(&self) -> watch::Receiver<AgentSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Signal` - goal signals, after delivery to the goals
    /// - `Topic::Lifecycle` - enter/exit/fault/no-route transitions
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use goap_runtime::{Event, LifecycleEvent, Topic};
    ///
    /// let mut lifecycle = handle.subscribe(Topic::Lifecycle);
    /// while let Ok(Event::Lifecycle(event)) = lifecycle.recv().await {
    ///     if let LifecycleEvent::Fault { goal, .. } = event {
    ///         eprintln!("{goal} faulted");
    ///     }
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Live facts; writes are visible to the next planning cycle.
    pub fn facts(&self) -> &SharedFacts {
        &self.facts
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
