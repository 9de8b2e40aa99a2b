//! Boundary to the input-injection layer.
//!
//! Goals issue named actuations (press a control, move toward a point, open an
//! interaction). From the core's point of view they are fire-and-forget; a
//! goal that needs the outcome waits on the resulting fact change with a
//! bounded timeout.
use std::borrow::Cow;
use std::time::Duration;

use super::errors::ActuationError;

/// A named input operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actuation {
    pub name: Cow<'static, str>,
    /// How long the control is held, if it is a press.
    pub hold: Option<Duration>,
}

impl Actuation {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            hold: None,
        }
    }

    pub fn held(name: impl Into<Cow<'static, str>>, hold: Duration) -> Self {
        Self {
            name: name.into(),
            hold: Some(hold),
        }
    }
}

/// Performs actuations on behalf of goals.
pub trait Actuator: Send {
    fn perform(&mut self, actuation: &Actuation) -> Result<(), ActuationError>;
}

/// Actuator that accepts every actuation and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullActuator;

impl Actuator for NullActuator {
    fn perform(&mut self, actuation: &Actuation) -> Result<(), ActuationError> {
        tracing::trace!(target: "goap::actuator", name = %actuation.name, "ignored");
        Ok(())
    }
}
