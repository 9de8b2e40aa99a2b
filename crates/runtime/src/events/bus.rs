//! Goal-to-goal mediator and supervisor fan-out.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, trace};

use super::types::{GoalEvent, LifecycleEvent};
use crate::goal::Goal;

/// Topics for supervisor subscriptions.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Goal signals, after synchronous delivery to the goals.
    Signal,
    /// Execution loop transitions.
    Lifecycle,
}

/// Event wrapper that carries the topic and typed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Signal(GoalEvent),
    Lifecycle(LifecycleEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Signal(_) => Topic::Signal,
            Event::Lifecycle(_) => Topic::Lifecycle,
        }
    }
}

/// Mediator between registered goals.
///
/// Goal signals are delivered synchronously, in emission order, to every
/// registered goal except the emitter ([`deliver`](Self::deliver)). A
/// panicking listener is logged and skipped; delivery continues with the
/// next one. Supervisors observe the same signals, plus lifecycle
/// transitions, through per-topic broadcast channels.
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a bus with the given capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = [Topic::Signal, Topic::Lifecycle]
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Delivers `event` to every goal other than its source.
    ///
    /// Returns the number of goals whose `on_event` returned normally.
    pub fn deliver(&self, event: &GoalEvent, goals: &mut [Box<dyn Goal>]) -> usize {
        let mut delivered = 0;

        for (index, goal) in goals.iter_mut().enumerate() {
            if event.source.is_some_and(|source| source.index() == index) {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| goal.on_event(event))) {
                Ok(()) => delivered += 1,
                Err(payload) => error!(
                    target: "goap::events",
                    goal = goal.name(),
                    event = %event,
                    panic = %panic_message(payload.as_ref()),
                    "Listener panicked, skipping"
                ),
            }
        }

        delivered
    }

    /// Publishes an event to its topic. Best-effort.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            trace!(target: "goap::events", ?topic, "no subscribers");
        }
    }

    pub fn publish_lifecycle(&self, event: LifecycleEvent) {
        self.publish(Event::Lifecycle(event));
    }

    /// Subscribes to a single topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        // Every topic gets a channel in `with_capacity`.
        &self.channels[&topic]
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
