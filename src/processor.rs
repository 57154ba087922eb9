//! Alert lifecycle orchestrator
//!
//! The consumer loop at the center of the system: fetch one event, decode,
//! enrich under a bounded timeout, persist, and only then commit the offset.
//! Every failure maps to exactly one of two decisions, commit or do not
//! commit; nothing propagates past the loop. The queue offset and the
//! database row are committed independently, so delivery is at-least-once
//! and the persist step must stay idempotent.

use crate::enrich::Analyze;
use crate::models::Alert;
use crate::queue::LoggingConsumer;
use crate::store::AlertStore;
use rdkafka::consumer::CommitMode;
use rdkafka::consumer::Consumer;
use rdkafka::message::BorrowedMessage;
use rdkafka::Message;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Backoff after a failed fetch
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Result of one processing cycle, driving the commit decision
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Enrichment persisted; commit the offset
    Processed,
    /// Unprocessable event (poison message); commit anyway so it cannot
    /// block the partition. There is no dead-letter path: the event is
    /// dropped.
    Skipped(String),
    /// Transient failure; leave the offset uncommitted so the queue
    /// redelivers the event unchanged
    Retryable(String),
}

/// Drive a single queued event through decode, enrichment, and persist.
///
/// Extracted from the consumer loop so the classification logic can be
/// exercised without a broker.
pub async fn process_payload<A: Analyze>(
    store: &AlertStore,
    analyzer: &A,
    payload: &[u8],
) -> ProcessOutcome {
    let alert: Alert = match serde_json::from_slice(payload) {
        Ok(alert) => alert,
        Err(e) => return ProcessOutcome::Skipped(format!("undecodable payload: {}", e)),
    };

    info!("Processing alert {} from {} for analysis", alert.id, alert.source);

    let enriched = match analyzer.analyze(&alert).await {
        Ok(enriched) => enriched,
        Err(e) => {
            return ProcessOutcome::Retryable(format!(
                "analysis failed for alert {}: {}",
                alert.id, e
            ))
        }
    };

    // The analyzed transition sets all enrichment fields atomically; a
    // response without them cannot be persisted.
    let Some(enrichment) = enriched.enrichment else {
        return ProcessOutcome::Retryable(format!(
            "analysis response for alert {} is missing enrichment fields",
            alert.id
        ));
    };

    match store.update_with_enrichment(&alert.id, &enrichment).await {
        Ok(()) => {
            info!(
                "Alert {} analyzed: predicted severity '{}', risk score {:.2}",
                alert.id, enrichment.predicted_severity, enrichment.risk_score
            );
            ProcessOutcome::Processed
        }
        Err(e) => ProcessOutcome::Retryable(format!(
            "failed to persist enrichment for alert {}: {}",
            alert.id, e
        )),
    }
}

/// The orchestrator: a strict fetch -> process -> conditionally-commit loop.
///
/// Runs sequentially; no cycle begins before the previous fetch returns.
/// Cancellation is cooperative: the token is observed between cycles and an
/// in-flight enrichment or store write is allowed to finish.
pub struct AlertProcessor<A: Analyze> {
    consumer: LoggingConsumer,
    store: AlertStore,
    analyzer: A,
    shutdown: CancellationToken,
}

impl<A: Analyze> AlertProcessor<A> {
    pub fn new(
        consumer: LoggingConsumer,
        store: AlertStore,
        analyzer: A,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            consumer,
            store,
            analyzer,
            shutdown,
        }
    }

    /// Main event loop; returns when the cancellation token fires
    pub async fn run(self) {
        info!("Alert processor online, waiting for alert events...");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping alert processor");
                    break;
                }
                result = self.consumer.recv() => match result {
                    Ok(message) => self.handle_message(&message).await,
                    Err(e) => {
                        error!("Failed to fetch alert event: {}", e);
                        tokio::time::sleep(FETCH_RETRY_DELAY).await;
                    }
                }
            }
        }

        info!("Alert processor stopped");
    }

    async fn handle_message(&self, message: &BorrowedMessage<'_>) {
        let payload = message.payload().unwrap_or_default();

        match process_payload(&self.store, &self.analyzer, payload).await {
            ProcessOutcome::Processed => self.commit(message),
            ProcessOutcome::Skipped(reason) => {
                warn!(
                    "Dropping event at partition {} offset {}: {}",
                    message.partition(),
                    message.offset(),
                    reason
                );
                self.commit(message);
            }
            ProcessOutcome::Retryable(reason) => {
                warn!(
                    "Event at partition {} offset {} left uncommitted for redelivery: {}",
                    message.partition(),
                    message.offset(),
                    reason
                );
            }
        }
    }

    /// Acknowledge the offset. Commit failures surface through the consumer
    /// context callback and are never fatal: the event is redelivered and
    /// the persist step tolerates the repeat.
    fn commit(&self, message: &BorrowedMessage<'_>) {
        if let Err(e) = self.consumer.commit_message(message, CommitMode::Async) {
            error!(
                "Failed to commit offset {} on partition {}: {}",
                message.offset(),
                message.partition(),
                e
            );
        }
    }
}
