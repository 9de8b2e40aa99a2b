//! Public runtime API surface.
//!
//! Errors, the supervisory handle, and the two boundaries the core talks
//! through: fact sources in, actuations out.

pub mod actuator;
pub mod errors;
pub mod handle;
pub mod sensor;

pub use actuator::{Actuation, Actuator, NullActuator};
pub use errors::{ActuationError, GoalError, Result, RuntimeError, SensorError};
pub use handle::RuntimeHandle;
pub use sensor::FactSource;
