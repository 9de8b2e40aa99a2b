//! Workers behind the runtime.
//!
//! The executor drives goals on a dedicated blocking thread; the sensor
//! worker refreshes shared facts from a tokio task.

mod executor;
mod metrics;
mod sensor;

pub use executor::{Executor, LoopState, TickOutcome};
pub use metrics::{ExecutorMetrics, MetricsSnapshot};
pub use sensor::SensorWorker;
