//! Background fact refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::metrics::ExecutorMetrics;
use crate::api::FactSource;
use crate::facts::SharedFacts;
use crate::stop::StopSignal;

/// Polls a [`FactSource`] on a fixed interval until the stop signal is raised.
pub struct SensorWorker {
    source: Box<dyn FactSource>,
    facts: SharedFacts,
    interval: Duration,
    stop: StopSignal,
    metrics: Arc<ExecutorMetrics>,
}

impl SensorWorker {
    pub fn new(
        source: Box<dyn FactSource>,
        facts: SharedFacts,
        interval: Duration,
        stop: StopSignal,
        metrics: Arc<ExecutorMetrics>,
    ) -> Self {
        Self {
            source,
            facts,
            interval: interval.max(Duration::from_millis(1)),
            stop,
            metrics,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failing = false;

        debug!(target: "goap::sensor", interval = ?self.interval, "sensor worker started");

        loop {
            ticker.tick().await;
            if self.stop.is_stopped() {
                break;
            }

            match self.source.refresh(&self.facts) {
                Ok(()) => {
                    self.metrics.record_refresh(true);
                    if failing {
                        failing = false;
                        info!(target: "goap::sensor", "fact source recovered");
                    }
                }
                Err(error) => {
                    self.metrics.record_refresh(false);
                    if failing {
                        debug!(target: "goap::sensor", error = %error, "fact refresh still failing");
                    } else {
                        failing = true;
                        warn!(target: "goap::sensor", error = %error, "fact refresh failed");
                    }
                }
            }
        }

        debug!(target: "goap::sensor", "sensor worker stopped");
    }
}
