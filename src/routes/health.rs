// src/routes/health.rs
//! API health check endpoint for the Weatherflow service.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is running. Besides the static
//! status it reports when the last aggregation cycle finished, so a stalled
//! poller is visible from outside.
//!
//! Exports to the gateway (`mod.rs`): a subrouter containing the `/health` route.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sink::SharedSnapshot;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    last_cycle: Option<DateTime<Utc>>,
}

/// Handle `GET /health`.
async fn health(State(snapshot): State<SharedSnapshot>) -> Json<HealthResponse> {
    // ---
    Json(HealthResponse {
        status: "ok",
        last_cycle: snapshot.current().last_cycle,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<SharedSnapshot> {
    Router::new().route("/health", get(health))
}
