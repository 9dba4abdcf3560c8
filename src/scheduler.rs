//! Fixed-interval driver: fetch a batch, hand it to the engine, repeat.
//!
//! Cycles run back to back on a single task, so batches reach the engine in
//! the order they were fetched and never overlap. A tick that comes due while
//! a cycle is still running is delayed rather than bunched up.

use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::pipeline::AggregationEngine;
use crate::sink::DisplaySink;
use crate::source::ReadingSource;

/// Run cycles every `every`, starting immediately.
///
/// `max_cycles` of `None` runs until the task is dropped. Returns the engine
/// so callers can inspect final state.
pub async fn run<R, S>(
    source: R,
    mut engine: AggregationEngine<S>,
    every: Duration,
    max_cycles: Option<usize>,
) -> AggregationEngine<S>
where
    R: ReadingSource,
    S: DisplaySink,
{
    // ---
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycle = 0usize;
    loop {
        if max_cycles.is_some_and(|max| cycle >= max) {
            break;
        }
        ticker.tick().await;
        cycle += 1;

        let batch = source.fetch_batch().await;
        info!(cycle, readings = batch.len(), "Starting cycle");
        engine.process_batch(batch, Utc::now());
    }

    info!(cycles = cycle, "Scheduler stopped");
    engine
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{ReadingPayload, KELVIN_OFFSET};
    use crate::pipeline::EngineConfig;
    use crate::sink::SharedSnapshot;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a hotter batch on every call.
    struct WarmingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReadingSource for WarmingSource {
        async fn fetch_batch(&self) -> Vec<ReadingPayload> {
            // ---
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as f64;
            vec![ReadingPayload {
                city: Some("Delhi".to_string()),
                temp_k: Some(20.0 + n + KELVIN_OFFSET),
                feels_like_k: Some(20.0 + n + KELVIN_OFFSET),
                condition: Some("Clear".to_string()),
                observed_at: Some(1_748_768_400 + n as i64),
                utc_offset_secs: None,
            }]
        }
    }

    #[tokio::test]
    async fn test_runs_requested_cycles_in_order() {
        // ---
        let source = WarmingSource {
            calls: AtomicUsize::new(0),
        };
        let shared = SharedSnapshot::new();
        let engine = AggregationEngine::new(EngineConfig::default(), shared.clone());

        let engine = run(source, engine, Duration::from_millis(5), Some(3)).await;

        let snapshot = shared.current();
        assert_eq!(snapshot, engine.snapshot());
        assert_eq!(snapshot.readings.len(), 1);
        // Latest reading comes from the third fetch
        assert!((snapshot.readings[0].temp_c - 22.0).abs() < 1e-9);
        assert_eq!(snapshot.readings[0].observed_at.timestamp(), 1_748_768_402);
    }

    #[tokio::test]
    async fn test_zero_cycles_returns_untouched_engine() {
        // ---
        let source = WarmingSource {
            calls: AtomicUsize::new(0),
        };
        let engine = AggregationEngine::new(EngineConfig::default(), SharedSnapshot::new());

        let engine = run(source, engine, Duration::from_millis(5), Some(0)).await;
        assert!(engine.snapshot().last_cycle.is_none());
    }
}
