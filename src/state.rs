//! Shared application state for the ingestion API

use crate::queue::Publish;
use crate::store::AlertStore;
use std::sync::Arc;

/// Dependencies shared across all request handlers.
///
/// Both handles are injected at startup and released on shutdown; nothing
/// here is ambient global state.
#[derive(Clone)]
pub struct AppState {
    /// Alert persistence, backed by a shared connection pool
    pub store: AlertStore,
    /// Durable event publishing to the alert topic
    pub publisher: Arc<dyn Publish>,
}

impl AppState {
    pub fn new(store: AlertStore, publisher: Arc<dyn Publish>) -> Self {
        Self { store, publisher }
    }
}
