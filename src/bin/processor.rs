//! vigil-processor - Alert processor daemon entry point

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use vigil::enrich::EnrichmentClient;
use vigil::processor::AlertProcessor;
use vigil::{queue, AlertStore, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vigil::init_tracing();

    let config = Config::from_env();

    // Store connectivity is the one fatal startup condition
    let store = AlertStore::open(&config.database_url)
        .await
        .context("failed to open alert store")?;

    let consumer = queue::create_consumer(
        &config.brokers(),
        &config.kafka_group_id,
        &config.kafka_topic,
    )
    .context("failed to create Kafka consumer")?;

    let analyzer =
        EnrichmentClient::new(config.enrich_url.clone()).context("failed to build HTTP client")?;
    tracing::info!("Analysis service URL: {}", config.enrich_url);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        vigil::shutdown_signal().await;
        tracing::info!("Received shutdown signal");
        signal_token.cancel();
    });

    AlertProcessor::new(consumer, store, analyzer, shutdown)
        .run()
        .await;

    Ok(())
}
