//! Kafka producer and consumer wrappers
//!
//! The producer hands messages to the client buffer and returns; delivery
//! failures surface only through a logging callback. The consumer runs with
//! auto-commit disabled so the orchestrator controls offset commits.

pub mod consumer;
pub mod producer;

pub use consumer::{create_consumer, LoggingConsumer};
pub use producer::{AlertPublisher, Publish};
