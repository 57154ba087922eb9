//! Client for the external alert analysis service

use crate::error::{VigilError, VigilResult};
use crate::models::Alert;
use async_trait::async_trait;
use std::time::Duration;

/// Deadline for a single analysis call
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(10);

/// Seam between the orchestrator and the analysis step.
///
/// One attempt per invocation; retries happen only through queue redelivery.
#[async_trait]
pub trait Analyze: Send + Sync {
    async fn analyze(&self, alert: &Alert) -> VigilResult<Alert>;
}

/// HTTP client for the analysis endpoint.
///
/// Sends the alert as the request body and expects the same shape echoed
/// back with the enrichment fields populated.
pub struct EnrichmentClient {
    client: reqwest::Client,
    url: String,
}

impl EnrichmentClient {
    pub fn new(url: impl Into<String>) -> VigilResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(ANALYZE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Analyze for EnrichmentClient {
    async fn analyze(&self, alert: &Alert) -> VigilResult<Alert> {
        let response = self.client.post(&self.url).json(alert).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VigilError::EnrichmentStatus(status));
        }

        let enriched = response.json::<Alert>().await?;
        Ok(enriched)
    }
}
