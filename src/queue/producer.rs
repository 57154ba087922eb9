//! Durable event publishing

use crate::error::{VigilError, VigilResult};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::{ClientContext, Message};
use std::time::Duration;
use tracing::{debug, error, info};

/// Seam between the ingestion side and the queue.
///
/// `publish` returns once the message is handed to the client buffer, not
/// once the broker has acknowledged it; delivery failures are reported
/// asynchronously and only logged.
pub trait Publish: Send + Sync {
    fn publish(&self, key: &str, payload: &[u8]) -> VigilResult<()>;
}

/// Producer context that logs delivery reports.
///
/// There is no compensating action for a failed delivery: an alert stored
/// at ingestion but never delivered stays at `new` until re-submitted.
struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        match result {
            Ok(message) => {
                debug!(
                    "Delivered alert event to partition {} offset {}",
                    message.partition(),
                    message.offset()
                );
            }
            Err((e, message)) => {
                let key = message
                    .key()
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default();
                error!("Failed to deliver alert event for key '{}': {}", key, e);
            }
        }
    }
}

/// Kafka-backed alert event publisher
pub struct AlertPublisher {
    producer: ThreadedProducer<DeliveryLogger>,
    topic: String,
}

impl AlertPublisher {
    /// Create a publisher for the given brokers and topic.
    ///
    /// Does not contact the brokers; connections are established lazily on
    /// the first send.
    pub fn new(brokers: &str, topic: impl Into<String>) -> VigilResult<Self> {
        let producer: ThreadedProducer<DeliveryLogger> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "30000")
            .create_with_context(DeliveryLogger)
            .map_err(|e| VigilError::Queue(e.to_string()))?;

        let topic = topic.into();
        info!("Kafka producer initialized for topic '{}' on brokers {}", topic, brokers);
        Ok(Self { producer, topic })
    }

    /// Flush buffered messages, bounded by `timeout`. Called on shutdown.
    pub fn flush(&self, timeout: Duration) -> VigilResult<()> {
        self.producer
            .flush(timeout)
            .map_err(|e| VigilError::Queue(e.to_string()))
    }
}

impl Publish for AlertPublisher {
    fn publish(&self, key: &str, payload: &[u8]) -> VigilResult<()> {
        self.producer
            .send(BaseRecord::to(&self.topic).key(key).payload(payload))
            .map_err(|(e, _)| VigilError::Queue(e.to_string()))
    }
}
