use axum::{extract::Query, extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{NormalizedReading, TemperatureBand};
use crate::sink::SharedSnapshot;

// ---

pub fn router() -> Router<SharedSnapshot> {
    // ---
    Router::new().route("/readings", get(handler))
}

/// One city card: the latest reading plus its presentation hints.
#[derive(Debug, Serialize)]
pub struct ReadingView {
    // ---
    pub city: String,
    pub condition: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub observed_at: DateTime<Utc>,
    pub temperature_band: TemperatureBand,
    pub feels_like_band: TemperatureBand,
    pub is_daytime: bool,
}

impl From<&NormalizedReading> for ReadingView {
    fn from(r: &NormalizedReading) -> Self {
        // ---
        ReadingView {
            city: r.city.clone(),
            condition: r.condition.clone(),
            temp_c: r.temp_c,
            feels_like_c: r.feels_like_c,
            observed_at: r.observed_at,
            temperature_band: r.temperature_band(),
            feels_like_band: r.feels_like_band(),
            is_daytime: r.is_daytime(),
        }
    }
}

/// Query parameters for filtering readings
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    city: Option<String>,
    limit: Option<u32>,
}

async fn handler(
    Query(params): Query<ReadingsQuery>,
    State(snapshot): State<SharedSnapshot>,
) -> Json<Vec<ReadingView>> {
    // ---
    debug!("GET /readings {:?}", params);
    let readings = snapshot.current().readings;
    Json(apply_filters(&readings, &params))
}

/// Apply query filters to the latest readings
fn apply_filters(readings: &[NormalizedReading], params: &ReadingsQuery) -> Vec<ReadingView> {
    // ---
    readings
        .iter()
        .filter(|r| {
            params
                .city
                .as_ref()
                .is_none_or(|city| r.city.eq_ignore_ascii_case(city))
        })
        .take(params.limit.unwrap_or(1000) as usize)
        .map(ReadingView::from)
        .collect()
}
