//! Goal signals and the bus that carries them.
//!
//! Goals talk to each other only through `(predicate, value)` signals; no goal
//! holds a reference to another. The bus delivers signals synchronously to the
//! other goals and republishes them, with lifecycle transitions, on topics
//! supervisors can subscribe to.

mod bus;
mod types;

pub(crate) use bus::panic_message;
pub use bus::{Event, EventBus, Topic};
pub use types::{GoalEvent, GoalPhase, LifecycleEvent};
