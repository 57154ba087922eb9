//! Vigil - Security alert ingestion and enrichment pipeline
//!
//! Alerts arrive over HTTP, are persisted, and flow through a durable Kafka
//! topic to the alert processor, which enriches them via an external
//! analysis service and writes the final state back. Delivery is
//! at-least-once: the processor commits an offset only after a successful,
//! idempotent persist.

pub mod api;
pub mod config;
pub mod enrich;
pub mod error;
pub mod models;
pub mod processor;
pub mod queue;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{VigilError, VigilResult};
pub use models::{Alert, AlertStatus, Enrichment};
pub use state::AppState;
pub use store::AlertStore;

/// Install the global tracing subscriber for a binary
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vigil=debug".into()),
        )
        .init();
}

/// Resolve when the process receives SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
