//! Error types for the alert pipeline

use crate::models::AlertStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Alert already exists: {0}")]
    Duplicate(String),

    #[error("Alert not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: AlertStatus, to: AlertStatus },

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Enrichment request failed: {0}")]
    Enrichment(#[from] reqwest::Error),

    #[error("Enrichment service returned status {0}")]
    EnrichmentStatus(reqwest::StatusCode),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type VigilResult<T> = Result<T, VigilError>;
