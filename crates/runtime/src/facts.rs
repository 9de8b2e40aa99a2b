//! Live world facts shared between the sensor side and the execution loop.
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use goap_planner::{FactBase, Predicate};

const UNKNOWN: u8 = 0;
const FALSE: u8 = 1;
const TRUE: u8 = 2;

/// Cloneable, lock-free fact store.
///
/// One atomic cell per [`Predicate`]. Each field is written and read
/// atomically on its own; a [`snapshot`](Self::snapshot) may therefore mix
/// values from different sensor passes, never a torn single field.
#[derive(Clone)]
pub struct SharedFacts {
    cells: Arc<[AtomicU8]>,
}

impl SharedFacts {
    pub fn new() -> Self {
        Self {
            cells: (0..Predicate::COUNT).map(|_| AtomicU8::new(UNKNOWN)).collect(),
        }
    }

    pub fn from_facts(facts: &FactBase) -> Self {
        let shared = Self::new();
        shared.store(facts);
        shared
    }

    pub fn get(&self, predicate: Predicate) -> Option<bool> {
        match self.cell(predicate).load(Ordering::Acquire) {
            TRUE => Some(true),
            FALSE => Some(false),
            _ => None,
        }
    }

    /// `true` only when the predicate is known and true.
    pub fn is_true(&self, predicate: Predicate) -> bool {
        self.get(predicate) == Some(true)
    }

    pub fn set(&self, predicate: Predicate, value: bool) {
        let raw = if value { TRUE } else { FALSE };
        self.cell(predicate).store(raw, Ordering::Release);
    }

    pub fn unset(&self, predicate: Predicate) {
        self.cell(predicate).store(UNKNOWN, Ordering::Release);
    }

    /// Writes every known entry of `facts`, leaving other predicates as they are.
    pub fn store(&self, facts: &FactBase) {
        for (predicate, value) in facts.iter() {
            self.set(predicate, value);
        }
    }

    pub fn clear(&self) {
        for cell in self.cells.iter() {
            cell.store(UNKNOWN, Ordering::Release);
        }
    }

    pub fn snapshot(&self) -> FactBase {
        Predicate::all()
            .filter_map(|predicate| self.get(predicate).map(|value| (predicate, value)))
            .collect()
    }

    fn cell(&self, predicate: Predicate) -> &AtomicU8 {
        &self.cells[predicate.index()]
    }
}

impl Default for SharedFacts {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedFacts").field(&self.snapshot()).finish()
    }
}
