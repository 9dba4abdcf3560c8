use axum::Router;

use crate::sink::SharedSnapshot;

mod alerts;
mod health;
mod readings;
mod summaries;

// ---

/// Read-only display API over the latest published snapshot.
pub fn router(snapshot: SharedSnapshot) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(summaries::router())
        .merge(alerts::router())
        .merge(health::router())
        .with_state(snapshot)
}
