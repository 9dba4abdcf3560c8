//! Daily rollup of normalized readings.
//!
//! Summaries are keyed by calendar day. Only the entry for the day being
//! processed is ever written; earlier days are left exactly as they were.
//!
//! In [`AggregationMode::LatestBatch`] (the default) each batch replaces the
//! day's summary, so it reflects the latest completed poll rather than the
//! whole day. [`AggregationMode::Cumulative`] folds every batch of the day
//! into one running summary instead.
//!
//! Non-finite temperatures are not clamped. A NaN reading turns mean, max and
//! min NaN together, and in cumulative mode they stay NaN for the rest of
//! the day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::classify::dominant;
use crate::models::{DailySummary, NormalizedReading};

pub type DailySummaries = BTreeMap<NaiveDate, DailySummary>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    #[default]
    LatestBatch,
    Cumulative,
}

// ---

/// Fold `batch` into the summary for `today`.
///
/// Returns `false` and leaves `summaries` untouched when the batch is empty.
pub fn update(
    summaries: &mut DailySummaries,
    batch: &[NormalizedReading],
    today: NaiveDate,
    mode: AggregationMode,
) -> bool {
    // ---
    if batch.is_empty() {
        return false;
    }

    match mode {
        AggregationMode::LatestBatch => {
            let mut summary = DailySummary::empty(today);
            summary.absorb(batch);
            summaries.insert(today, summary);
        }
        AggregationMode::Cumulative => {
            summaries
                .entry(today)
                .or_insert_with(|| DailySummary::empty(today))
                .absorb(batch);
        }
    }
    true
}

impl DailySummary {
    // ---
    /// Fold a non-empty batch into this summary and refresh the derived fields.
    fn absorb(&mut self, batch: &[NormalizedReading]) {
        // ---
        for reading in batch {
            self.temp_sum += reading.temp_c;
            self.max_temp = self.max_temp.max(reading.temp_c);
            self.min_temp = self.min_temp.min(reading.temp_c);
            self.conditions.push(reading.condition.clone());
        }
        self.reading_count += batch.len();
        self.avg_temp = self.temp_sum / self.reading_count as f64;
        // f64::max/min skip NaN; keep the three statistics NaN together instead
        if self.avg_temp.is_nan() {
            self.max_temp = f64::NAN;
            self.min_temp = f64::NAN;
        }
        if let Some(condition) = dominant(&self.conditions) {
            self.dominant_condition = condition.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(city: &str, temp_c: f64, condition: &str) -> NormalizedReading {
        // ---
        NormalizedReading {
            city: city.to_string(),
            temp_c,
            feels_like_c: temp_c,
            condition: condition.to_string(),
            observed_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            utc_offset_secs: 0,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_mean_max_min() {
        // ---
        let mut summaries = DailySummaries::new();
        let batch = [
            reading("Delhi", 20.0, "Clear"),
            reading("Mumbai", 30.0, "Rain"),
            reading("Chennai", 10.0, "Clear"),
        ];

        assert!(update(&mut summaries, &batch, day(1), AggregationMode::LatestBatch));

        let summary = &summaries[&day(1)];
        assert_eq!(summary.avg_temp, 20.0);
        assert_eq!(summary.max_temp, 30.0);
        assert_eq!(summary.min_temp, 10.0);
        assert_eq!(summary.reading_count, 3);
        assert_eq!(summary.dominant_condition, "Clear");
    }

    #[test]
    fn test_single_city_batch() {
        // ---
        let mut summaries = DailySummaries::new();
        update(
            &mut summaries,
            &[reading("Kolkata", 27.35, "Haze")],
            day(1),
            AggregationMode::LatestBatch,
        );

        let summary = &summaries[&day(1)];
        assert_eq!(summary.avg_temp, 27.35);
        assert_eq!(summary.max_temp, 27.35);
        assert_eq!(summary.min_temp, 27.35);
        assert_eq!(summary.dominant_condition, "Haze");
    }

    #[test]
    fn test_identical_temperatures() {
        // ---
        let mut summaries = DailySummaries::new();
        let batch = [
            reading("Delhi", 25.0, "Clear"),
            reading("Mumbai", 25.0, "Clear"),
            reading("Chennai", 25.0, "Clear"),
        ];
        update(&mut summaries, &batch, day(1), AggregationMode::LatestBatch);

        let summary = &summaries[&day(1)];
        assert_eq!(summary.avg_temp, 25.0);
        assert_eq!(summary.max_temp, 25.0);
        assert_eq!(summary.min_temp, 25.0);
    }

    #[test]
    fn test_latest_batch_replaces_same_day() {
        // ---
        let mut summaries = DailySummaries::new();
        let first = [reading("Delhi", 40.0, "Clear"), reading("Mumbai", 30.0, "Clear")];
        let second = [reading("Delhi", 12.0, "Rain"), reading("Mumbai", 14.0, "Rain")];

        update(&mut summaries, &first, day(1), AggregationMode::LatestBatch);
        update(&mut summaries, &second, day(1), AggregationMode::LatestBatch);

        let summary = &summaries[&day(1)];
        assert_eq!(summary.avg_temp, 13.0);
        assert_eq!(summary.max_temp, 14.0);
        assert_eq!(summary.min_temp, 12.0);
        assert_eq!(summary.reading_count, 2);
        assert_eq!(summary.dominant_condition, "Rain");
    }

    #[test]
    fn test_empty_batch_leaves_day_untouched() {
        // ---
        let mut summaries = DailySummaries::new();
        update(
            &mut summaries,
            &[reading("Delhi", 22.0, "Clear")],
            day(1),
            AggregationMode::LatestBatch,
        );
        let before = summaries.clone();

        assert!(!update(&mut summaries, &[], day(1), AggregationMode::LatestBatch));
        assert!(!update(&mut summaries, &[], day(2), AggregationMode::Cumulative));
        assert_eq!(summaries, before);
    }

    #[test]
    fn test_prior_days_are_frozen() {
        // ---
        let mut summaries = DailySummaries::new();
        update(
            &mut summaries,
            &[reading("Delhi", 22.0, "Clear")],
            day(1),
            AggregationMode::LatestBatch,
        );
        let yesterday = summaries[&day(1)].clone();

        update(
            &mut summaries,
            &[reading("Delhi", 31.0, "Rain")],
            day(2),
            AggregationMode::LatestBatch,
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[&day(1)], yesterday);
        assert_eq!(summaries[&day(2)].avg_temp, 31.0);
    }

    #[test]
    fn test_cumulative_merges_same_day() {
        // ---
        let mut summaries = DailySummaries::new();
        let first = [reading("Delhi", 40.0, "Clear"), reading("Mumbai", 30.0, "Rain")];
        let second = [reading("Delhi", 10.0, "Rain"), reading("Mumbai", 20.0, "Clear")];

        update(&mut summaries, &first, day(1), AggregationMode::Cumulative);
        update(&mut summaries, &second, day(1), AggregationMode::Cumulative);

        let summary = &summaries[&day(1)];
        assert_eq!(summary.reading_count, 4);
        assert_eq!(summary.temp_sum, 100.0);
        assert_eq!(summary.avg_temp, 25.0);
        assert_eq!(summary.max_temp, 40.0);
        assert_eq!(summary.min_temp, 10.0);
        // Clear and Rain tie at two; Clear was seen first
        assert_eq!(summary.dominant_condition, "Clear");
    }

    #[test]
    fn test_nan_reading_poisons_all_statistics() {
        // ---
        let mut summaries = DailySummaries::new();
        let batch = [reading("Delhi", 20.0, "Clear"), reading("Mumbai", f64::NAN, "Rain")];
        update(&mut summaries, &batch, day(1), AggregationMode::LatestBatch);

        let summary = &summaries[&day(1)];
        assert!(summary.avg_temp.is_nan());
        assert!(summary.max_temp.is_nan());
        assert!(summary.min_temp.is_nan());
        assert_eq!(summary.reading_count, 2);
    }

    #[test]
    fn test_nan_persists_for_the_day_in_cumulative_mode() {
        // ---
        let mut summaries = DailySummaries::new();
        let first = [reading("Delhi", 20.0, "Clear"), reading("Mumbai", f64::NAN, "Rain")];
        let second = [reading("Delhi", 30.0, "Clear"), reading("Mumbai", 10.0, "Rain")];

        update(&mut summaries, &first, day(1), AggregationMode::Cumulative);
        update(&mut summaries, &second, day(1), AggregationMode::Cumulative);

        let summary = &summaries[&day(1)];
        assert_eq!(summary.reading_count, 4);
        assert!(summary.avg_temp.is_nan());
        assert!(summary.max_temp.is_nan());
        assert!(summary.min_temp.is_nan());

        // A new day starts clean
        update(&mut summaries, &second, day(2), AggregationMode::Cumulative);
        assert_eq!(summaries[&day(2)].avg_temp, 20.0);
    }

    #[test]
    fn test_latest_batch_recovers_after_nan() {
        // ---
        let mut summaries = DailySummaries::new();
        let first = [reading("Delhi", f64::NAN, "Clear")];
        let second = [reading("Delhi", 30.0, "Clear"), reading("Mumbai", 10.0, "Rain")];

        update(&mut summaries, &first, day(1), AggregationMode::LatestBatch);
        update(&mut summaries, &second, day(1), AggregationMode::LatestBatch);

        let summary = &summaries[&day(1)];
        assert_eq!(summary.avg_temp, 20.0);
        assert_eq!(summary.max_temp, 30.0);
        assert_eq!(summary.min_temp, 10.0);
    }

    #[test]
    fn test_mean_between_extremes() {
        // ---
        let mut summaries = DailySummaries::new();
        let batch = [
            reading("Delhi", 33.1, "Clear"),
            reading("Mumbai", 29.4, "Clouds"),
            reading("Chennai", 31.7, "Clouds"),
            reading("Bangalore", 22.9, "Rain"),
        ];
        update(&mut summaries, &batch, day(1), AggregationMode::Cumulative);

        let summary = &summaries[&day(1)];
        assert!(summary.max_temp >= summary.avg_temp);
        assert!(summary.avg_temp >= summary.min_temp);
        assert_eq!(summary.dominant_condition, "Clouds");
    }
}
