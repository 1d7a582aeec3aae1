//! HTTP handlers.

use axum::Json;
use axum::extract::State;
use valmon_core::ServerState;

use crate::state::AppState;

/// Current server snapshot as JSON.
///
/// The snapshot is cloned under the read lock and serialized after it is
/// released, so a slow client never holds up ingestion.
pub async fn status(State(state): State<AppState>) -> Json<ServerState> {
    Json(state.store.snapshot())
}

/// Liveness probe for the monitor itself.
pub async fn health_check() -> &'static str {
    "OK"
}
