//! Execution loop counters.
//!
//! Lock-free, shared between the loop thread, the sensor task and any
//! supervisor holding a [`RuntimeHandle`](crate::RuntimeHandle).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    ticks: AtomicU64,
    plans_built: AtomicU64,
    no_route_ticks: AtomicU64,
    goals_entered: AtomicU64,
    goals_exited: AtomicU64,
    faults: AtomicU64,
    events_delivered: AtomicU64,
    sensor_refreshes: AtomicU64,
    sensor_failures: AtomicU64,
}

impl ExecutorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_plan(&self) {
        self.plans_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_route(&self) {
        self.no_route_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enter(&self) {
        self.goals_entered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exit(&self) {
        self.goals_exited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds `count` goal deliveries of a single signal.
    pub fn record_deliveries(&self, count: u64) {
        self.events_delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_refresh(&self, ok: bool) {
        if ok {
            self.sensor_refreshes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.sensor_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Fraction of ticks that found no route, 0.0 when nothing ran yet.
    pub fn no_route_ratio(&self) -> f64 {
        let ticks = self.ticks();
        if ticks == 0 {
            0.0
        } else {
            self.no_route_ticks.load(Ordering::Relaxed) as f64 / ticks as f64
        }
    }

    /// Not atomic across fields; each counter is read on its own.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks(),
            plans_built: self.plans_built.load(Ordering::Relaxed),
            no_route_ticks: self.no_route_ticks.load(Ordering::Relaxed),
            goals_entered: self.goals_entered.load(Ordering::Relaxed),
            goals_exited: self.goals_exited.load(Ordering::Relaxed),
            faults: self.faults(),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            sensor_refreshes: self.sensor_refreshes.load(Ordering::Relaxed),
            sensor_failures: self.sensor_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub plans_built: u64,
    pub no_route_ticks: u64,
    pub goals_entered: u64,
    pub goals_exited: u64,
    pub faults: u64,
    pub events_delivered: u64,
    pub sensor_refreshes: u64,
    pub sensor_failures: u64,
}
