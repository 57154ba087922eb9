//! Kafka consumer construction

use crate::error::{VigilError, VigilResult};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::stream_consumer::StreamConsumer;
use rdkafka::consumer::{Consumer, ConsumerContext};
use rdkafka::error::KafkaResult;
use rdkafka::{ClientContext, TopicPartitionList};
use tracing::{debug, error, info};

/// Consumer context that logs offset-commit results.
///
/// A failed commit is not fatal: the message is simply redelivered, which is
/// safe because the enrichment write is idempotent.
pub struct LoggingConsumerContext;

impl ClientContext for LoggingConsumerContext {}

impl ConsumerContext for LoggingConsumerContext {
    fn commit_callback(&self, result: KafkaResult<()>, offsets: &TopicPartitionList) {
        match result {
            Ok(()) => debug!("Committed offsets: {:?}", offsets),
            Err(e) => error!("Failed to commit offsets {:?}: {}", offsets, e),
        }
    }
}

pub type LoggingConsumer = StreamConsumer<LoggingConsumerContext>;

/// Build a consumer subscribed to the alert topic.
///
/// Auto-commit is disabled: the processor commits explicitly, and only
/// after a successful persist.
pub fn create_consumer(brokers: &str, group_id: &str, topic: &str) -> VigilResult<LoggingConsumer> {
    let consumer: LoggingConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .set("session.timeout.ms", "6000")
        .set("enable.partition.eof", "false")
        .create_with_context(LoggingConsumerContext)
        .map_err(|e| VigilError::Queue(e.to_string()))?;

    consumer
        .subscribe(&[topic])
        .map_err(|e| VigilError::Queue(e.to_string()))?;

    info!(
        "Kafka consumer initialized for topic '{}', group '{}' on brokers {}",
        topic, group_id, brokers
    );
    Ok(consumer)
}
