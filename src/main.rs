//! vigil-api - Ingestion API server entry point

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use vigil::queue::AlertPublisher;
use vigil::{api, AlertStore, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vigil::init_tracing();

    let config = Config::from_env();

    // Store connectivity is the one fatal startup condition
    let store = AlertStore::open(&config.database_url)
        .await
        .context("failed to open alert store")?;

    let publisher = Arc::new(
        AlertPublisher::new(&config.brokers(), &config.kafka_topic)
            .context("failed to create Kafka producer")?,
    );

    let state = AppState::new(store, publisher.clone());
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    tracing::info!("Alert API listening on http://{}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(vigil::shutdown_signal())
        .await?;

    // Drain any events still sitting in the producer buffer
    if let Err(e) = publisher.flush(Duration::from_secs(5)) {
        tracing::warn!("Failed to flush producer on shutdown: {}", e);
    }

    tracing::info!("Alert API stopped");
    Ok(())
}
