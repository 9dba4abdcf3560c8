//! Weather polling, daily aggregation and threshold alerting.
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! drive them directly.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod scheduler;
pub mod sink;
pub mod source;

pub use config::Config;
pub use error::ReadingError;
pub use models::{AlertEvent, DailySummary, NormalizedReading, RawReading, ReadingPayload};
