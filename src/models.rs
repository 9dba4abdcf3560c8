//! Data models for the weather pipeline.
//!
//! A reading travels through three shapes:
//! - [`ReadingPayload`]: what the reading source delivered, every field optional
//! - [`RawReading`]: a validated reading, temperatures still in Kelvin
//! - [`NormalizedReading`]: the same reading converted to Celsius
//!
//! Daily rollups and alerts are produced from normalized readings only.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReadingError;

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

// ---

/// A reading as delivered by the reading source, possibly incomplete.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ReadingPayload {
    // ---
    pub city: Option<String>,
    pub temp_k: Option<f64>,
    pub feels_like_k: Option<f64>,
    pub condition: Option<String>,
    /// Observation time, UTC seconds since the epoch.
    pub observed_at: Option<i64>,
    /// Shift of the city's local time from UTC, in seconds.
    pub utc_offset_secs: Option<i32>,
}

/// One validated measurement for one city at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawReading {
    // ---
    pub city: String,
    pub temp_k: f64,
    pub feels_like_k: f64,
    pub condition: String,
    pub observed_at: DateTime<Utc>,
    pub utc_offset_secs: i32,
}

/// A reading with its temperatures expressed in Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReading {
    // ---
    pub city: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub observed_at: DateTime<Utc>,
    pub utc_offset_secs: i32,
}

/// Rollup of one calendar day.
///
/// `max_temp` and `min_temp` start at the `-inf`/`+inf` sentinels so the
/// first reading folded in always replaces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    // ---
    pub day: NaiveDate,
    pub temp_sum: f64,
    pub reading_count: usize,
    pub avg_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub dominant_condition: String,
    /// Every condition folded into this day, in arrival order.
    pub conditions: Vec<String>,
}

/// Raised when at least two cities in one batch exceed the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    // ---
    pub id: Uuid,
    pub raised_at: DateTime<Utc>,
    pub message: String,
    pub threshold: f64,
    pub qualifying_count: usize,
    pub cities: Vec<String>,
}

/// Coarse feel of a temperature, as shown next to each city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Hot,
    Warm,
    Cold,
}

// ---

impl TryFrom<ReadingPayload> for RawReading {
    type Error = ReadingError;

    fn try_from(payload: ReadingPayload) -> Result<Self, Self::Error> {
        // ---
        let city = non_empty(payload.city, "city")?;
        let condition = non_empty(payload.condition, "condition")?;
        let temp_k = payload.temp_k.ok_or(ReadingError::MissingField("temp"))?;
        let feels_like_k = payload
            .feels_like_k
            .ok_or(ReadingError::MissingField("feels_like"))?;
        let secs = payload
            .observed_at
            .ok_or(ReadingError::MissingField("observed_at"))?;
        let observed_at =
            DateTime::from_timestamp(secs, 0).ok_or(ReadingError::BadTimestamp(secs))?;

        Ok(RawReading {
            city,
            temp_k,
            feels_like_k,
            condition,
            observed_at,
            utc_offset_secs: payload.utc_offset_secs.unwrap_or(0),
        })
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, ReadingError> {
    // ---
    match value {
        None => Err(ReadingError::MissingField(field)),
        Some(v) if v.trim().is_empty() => Err(ReadingError::EmptyField(field)),
        Some(v) => Ok(v),
    }
}

impl RawReading {
    // ---
    /// Convert Kelvin fields to Celsius. Non-finite values pass through as-is.
    pub fn to_normalized(&self) -> NormalizedReading {
        // ---
        NormalizedReading {
            city: self.city.clone(),
            temp_c: self.temp_k - KELVIN_OFFSET,
            feels_like_c: self.feels_like_k - KELVIN_OFFSET,
            condition: self.condition.clone(),
            observed_at: self.observed_at,
            utc_offset_secs: self.utc_offset_secs,
        }
    }
}

/// Free-function form of [`RawReading::to_normalized`].
pub fn normalize(raw: &RawReading) -> NormalizedReading {
    raw.to_normalized()
}

impl NormalizedReading {
    // ---
    pub fn temperature_band(&self) -> TemperatureBand {
        TemperatureBand::from_celsius(self.temp_c)
    }

    pub fn feels_like_band(&self) -> TemperatureBand {
        TemperatureBand::from_celsius(self.feels_like_c)
    }

    /// True between 06:00 and 18:00 in the city's own local time.
    ///
    /// False when the shifted time falls outside the representable range.
    pub fn is_daytime(&self) -> bool {
        // ---
        let shift = Duration::seconds(i64::from(self.utc_offset_secs));
        match self.observed_at.checked_add_signed(shift) {
            Some(local) => (6..18).contains(&local.hour()),
            None => false,
        }
    }
}

impl TemperatureBand {
    // ---
    pub fn from_celsius(temp_c: f64) -> Self {
        // ---
        if temp_c > 30.0 {
            TemperatureBand::Hot
        } else if temp_c > 20.0 {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Cold
        }
    }
}

impl DailySummary {
    // ---
    /// A summary with no readings folded in yet.
    pub fn empty(day: NaiveDate) -> Self {
        // ---
        DailySummary {
            day,
            temp_sum: 0.0,
            reading_count: 0,
            avg_temp: f64::NAN,
            max_temp: f64::NEG_INFINITY,
            min_temp: f64::INFINITY,
            dominant_condition: String::new(),
            conditions: Vec::new(),
        }
    }
}
