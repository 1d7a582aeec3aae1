//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::{AppState, AxumContext};

/// Path the status document is served on.
pub const STATUS_PATH: &str = "/valheim/status";

/// Build the router: the status document plus `/health`.
///
/// Requests are not rate limited; keep the endpoint off public interfaces.
pub fn create_router(ctx: AxumContext) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route(STATUS_PATH, get(handlers::status))
        .route("/valheim/status/", get(handlers::status))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
