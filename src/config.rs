//! Environment-based configuration
//!
//! Every variable is optional; missing values fall back to local-development
//! defaults and the fallback is logged.

/// Application-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or sqlite URL for the alert database
    pub database_url: String,
    /// Listen address for the ingestion API
    pub server_addr: String,
    /// Kafka broker address list
    pub kafka_brokers: Vec<String>,
    /// Topic the alert events flow through
    pub kafka_topic: String,
    /// Consumer group of the alert processor
    pub kafka_group_id: String,
    /// Endpoint of the external analysis service
    pub enrich_url: String,
}

impl Config {
    /// Read configuration from environment variables
    pub fn from_env() -> Self {
        let brokers = env_or("KAFKA_BROKERS", "localhost:9092");
        let kafka_brokers = brokers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url: env_or("DATABASE_URL", "vigil.db"),
            server_addr: env_or("SERVER_ADDR", "127.0.0.1:8080"),
            kafka_brokers,
            kafka_topic: env_or("KAFKA_TOPIC", "security-alerts"),
            kafka_group_id: env_or("KAFKA_GROUP_ID", "vigil-processor"),
            enrich_url: env_or("ENRICH_URL", "http://localhost:8000/analyze-alert"),
        }
    }

    /// Broker list in the comma-joined form the Kafka client expects
    pub fn brokers(&self) -> String {
        self.kafka_brokers.join(",")
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            tracing::info!("{} not set, using default '{}'", key, default);
            default.to_string()
        }
    }
}
