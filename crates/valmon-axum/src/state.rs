//! Shared application state type.

use std::sync::Arc;

use valmon_core::StateStore;

/// Everything the status handlers read from.
#[derive(Debug, Clone)]
pub struct AxumContext {
    /// The live server snapshot written by the ingestion pipeline.
    pub store: StateStore,
}

/// Application state shared across all handlers.
pub type AppState = Arc<AxumContext>;
