//! Aggregation engine: runs one batch through the whole pipeline.
//!
//! Each call to [`AggregationEngine::process_batch`] is one cycle:
//! validate and normalize every delivered reading, fold the survivors into
//! today's summary, evaluate the alert threshold, then publish a snapshot.
//! The engine owns all mutable state and has no timer of its own.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, info, warn};

use super::aggregate::{self, AggregationMode, DailySummaries};
use super::alert::{self, DEFAULT_THRESHOLD_C};
use crate::models::{AlertEvent, NormalizedReading, RawReading, ReadingPayload};
use crate::sink::{DisplaySink, Snapshot};

/// Tunables for the engine, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    // ---
    pub threshold: f64,
    pub mode: AggregationMode,
    /// Offset used to turn the processing instant into a calendar day.
    pub day_offset: FixedOffset,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // ---
        Self {
            threshold: DEFAULT_THRESHOLD_C,
            mode: AggregationMode::default(),
            day_offset: Utc.fix(),
        }
    }
}

/// What happened during a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    // ---
    pub day: NaiveDate,
    pub accepted: usize,
    pub rejected: usize,
    pub summary_updated: bool,
    pub alert: Option<AlertEvent>,
}

pub struct AggregationEngine<S> {
    config: EngineConfig,
    sink: S,
    /// Latest reading per city, in the order cities were first seen.
    latest: Vec<NormalizedReading>,
    summaries: DailySummaries,
    alerts: Vec<AlertEvent>,
    last_cycle: Option<DateTime<Utc>>,
}

impl<S: DisplaySink> AggregationEngine<S> {
    // ---
    pub fn new(config: EngineConfig, sink: S) -> Self {
        // ---
        Self {
            config,
            sink,
            latest: Vec::new(),
            summaries: DailySummaries::new(),
            alerts: Vec::new(),
            last_cycle: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one cycle over `batch`, processed at instant `now`.
    ///
    /// Malformed readings are dropped from this cycle only. A batch with no
    /// usable readings leaves the summaries alone and raises no alert, but a
    /// snapshot is still published.
    pub fn process_batch(
        &mut self,
        batch: Vec<ReadingPayload>,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        // ---
        let day = now.with_timezone(&self.config.day_offset).date_naive();
        let delivered = batch.len();

        let normalized: Vec<NormalizedReading> = batch
            .into_iter()
            .enumerate()
            .filter_map(|(i, payload)| {
                let city = payload.city.clone().unwrap_or_default();
                match RawReading::try_from(payload) {
                    Ok(raw) => Some(raw.to_normalized()),
                    Err(e) => {
                        warn!(index = i, city = %city, error = %e, "Dropping malformed reading");
                        None
                    }
                }
            })
            .collect();

        let accepted = normalized.len();
        debug!(delivered, accepted, %day, "Batch normalized");

        let summary_updated =
            aggregate::update(&mut self.summaries, &normalized, day, self.config.mode);

        let alert = alert::evaluate(&normalized, self.config.threshold, now);
        if let Some(event) = &alert {
            warn!(
                threshold = event.threshold,
                qualifying = event.qualifying_count,
                "{}",
                event.message
            );
            self.alerts.push(event.clone());
        }

        for reading in normalized {
            match self.latest.iter_mut().find(|r| r.city == reading.city) {
                Some(slot) => *slot = reading,
                None => self.latest.push(reading),
            }
        }
        self.last_cycle = Some(now);

        self.sink.publish(self.snapshot());

        info!(
            accepted,
            rejected = delivered - accepted,
            summary_updated,
            alerts_total = self.alerts.len(),
            "Cycle complete"
        );

        CycleOutcome {
            day,
            accepted,
            rejected: delivered - accepted,
            summary_updated,
            alert,
        }
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        // ---
        Snapshot {
            readings: self.latest.clone(),
            summaries: self.summaries.clone(),
            alerts: self.alerts.clone(),
            last_cycle: self.last_cycle,
        }
    }
}
