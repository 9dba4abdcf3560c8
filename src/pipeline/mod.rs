//! Aggregation & alerting core.
//!
//! Siblings stay private; this gateway re-exports what the rest of the crate
//! is allowed to use.

mod aggregate;
mod alert;
mod classify;
mod engine;

pub use aggregate::{update, AggregationMode, DailySummaries};
pub use alert::{evaluate, DEFAULT_THRESHOLD_C, MIN_QUALIFYING_CITIES};
pub use classify::dominant;
pub use engine::{AggregationEngine, CycleOutcome, EngineConfig};
