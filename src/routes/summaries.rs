use axum::{extract::Query, extract::State, routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::models::DailySummary;
use crate::sink::SharedSnapshot;

// ---

pub fn router() -> Router<SharedSnapshot> {
    // ---
    Router::new().route("/summaries", get(handler))
}

/// Query parameters for selecting daily summaries
#[derive(Debug, Deserialize)]
pub struct SummariesQuery {
    /// Calendar day, e.g. `2025-06-01`
    day: Option<NaiveDate>,
}

/// Daily summaries, oldest day first.
async fn handler(
    Query(params): Query<SummariesQuery>,
    State(snapshot): State<SharedSnapshot>,
) -> Json<Vec<DailySummary>> {
    // ---
    debug!("GET /summaries {:?}", params);
    let summaries = snapshot.current().summaries;

    let selected: Vec<DailySummary> = summaries
        .into_values()
        .filter(|s| params.day.is_none_or(|day| s.day == day))
        .collect();
    Json(selected)
}
