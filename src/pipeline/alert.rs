//! Threshold alerting over a normalized batch.
//!
//! Evaluation is stateless. Repeated qualifying batches each produce their
//! own event; keeping the log is the engine's job.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AlertEvent, NormalizedReading};

/// Alerts need at least this many cities above the threshold in one batch.
pub const MIN_QUALIFYING_CITIES: usize = 2;

/// Default alert threshold in degrees Celsius.
pub const DEFAULT_THRESHOLD_C: f64 = 35.0;

// ---

/// Emit an alert when two or more readings are strictly above `threshold`.
pub fn evaluate(
    batch: &[NormalizedReading],
    threshold: f64,
    now: DateTime<Utc>,
) -> Option<AlertEvent> {
    // ---
    let cities: Vec<String> = batch
        .iter()
        .filter(|r| r.temp_c > threshold)
        .map(|r| r.city.clone())
        .collect();

    if cities.len() < MIN_QUALIFYING_CITIES {
        return None;
    }

    Some(AlertEvent {
        id: Uuid::new_v4(),
        raised_at: now,
        message: format!(
            "Temperature above {:.1}°C in {} cities: {}",
            threshold,
            cities.len(),
            cities.join(", ")
        ),
        threshold,
        qualifying_count: cities.len(),
        cities,
    })
}
