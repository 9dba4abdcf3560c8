//! Display sink: the consumer of engine state after every cycle.
//!
//! The engine hands out owned [`Snapshot`] copies, so nothing on the display
//! side can reach back into the summaries map or the alert log.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AlertEvent, NormalizedReading};
use crate::pipeline::DailySummaries;

/// Read-only copy of engine state taken at the end of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    // ---
    /// Latest reading per city, in the order cities were first seen.
    pub readings: Vec<NormalizedReading>,
    pub summaries: DailySummaries,
    /// Every alert raised since startup, oldest first.
    pub alerts: Vec<AlertEvent>,
    pub last_cycle: Option<DateTime<Utc>>,
}

pub trait DisplaySink {
    fn publish(&self, snapshot: Snapshot);
}

/// Thread-safe sink holding the most recent snapshot for the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Snapshot>>,
}

impl SharedSnapshot {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone out the current snapshot.
    pub fn current(&self) -> Snapshot {
        // ---
        // A poisoned lock still holds a complete snapshot; publish swaps whole values
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DisplaySink for SharedSnapshot {
    fn publish(&self, snapshot: Snapshot) {
        // ---
        match self.inner.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
