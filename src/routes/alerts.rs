use axum::{extract::Query, extract::State, routing::get, Json, Router};
use serde::Deserialize;
use tracing::debug;

use crate::models::AlertEvent;
use crate::sink::SharedSnapshot;

// ---

pub fn router() -> Router<SharedSnapshot> {
    // ---
    Router::new().route("/alerts", get(handler))
}

/// Query parameters for the alert log
#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    /// Keep only the most recent `limit` alerts.
    limit: Option<usize>,
}

/// Alert log in emission order.
async fn handler(
    Query(params): Query<AlertsQuery>,
    State(snapshot): State<SharedSnapshot>,
) -> Json<Vec<AlertEvent>> {
    // ---
    debug!("GET /alerts {:?}", params);
    let mut alerts = snapshot.current().alerts;

    if let Some(limit) = params.limit {
        let skip = alerts.len().saturating_sub(limit);
        alerts.drain(..skip);
    }
    Json(alerts)
}
