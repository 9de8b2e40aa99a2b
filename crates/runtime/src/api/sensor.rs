//! Boundary to the fact-acquisition layer.
//!
//! The core never reads sensors itself. A [`FactSource`] is polled by the
//! sensor worker on a fixed short interval and writes whatever it observed
//! into [`SharedFacts`]; any other producer may write there directly.
use super::errors::SensorError;
use crate::facts::SharedFacts;

/// Producer of world facts (screen reader, memory reader, simulator...).
pub trait FactSource: Send + 'static {
    /// Reads the sensors once and stores the results.
    ///
    /// Writes are per field; readers may observe a mix of old and new
    /// values, which the execution loop tolerates by re-planning every tick.
    fn refresh(&mut self, facts: &SharedFacts) -> Result<(), SensorError>;
}

impl<F> FactSource for F
where
    F: FnMut(&SharedFacts) -> Result<(), SensorError> + Send + 'static,
{
    fn refresh(&mut self, facts: &SharedFacts) -> Result<(), SensorError> {
        self(facts)
    }
}
