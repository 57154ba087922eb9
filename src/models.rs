//! Alert data model and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an alert
///
/// The happy path is `new -> queued -> analyzed`. The `queued` step is
/// implicit (set when the alert is published, never persisted separately),
/// so the store also accepts `new -> analyzed` directly. `analyzed` is
/// repeatable: redelivered events re-apply the same final write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Stored at ingestion, not yet analyzed
    New,
    /// Published to the queue, awaiting analysis
    Queued,
    /// Enrichment results written back
    Analyzed,
}

impl AlertStatus {
    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// A status never regresses; `Analyzed -> Analyzed` stays legal so that
    /// the enrichment write can be repeated under at-least-once delivery.
    pub fn can_transition_to(self, to: AlertStatus) -> bool {
        matches!(
            (self, to),
            (AlertStatus::New, AlertStatus::Queued)
                | (AlertStatus::New, AlertStatus::Analyzed)
                | (AlertStatus::Queued, AlertStatus::Analyzed)
                | (AlertStatus::Analyzed, AlertStatus::Analyzed)
        )
    }

    /// Statuses a row may hold for a write to `to` to be legal.
    ///
    /// Folded into the `WHERE` clause of store updates so the transition
    /// table is enforced in the same statement that performs the write.
    pub fn allowed_predecessors(to: AlertStatus) -> &'static [AlertStatus] {
        match to {
            AlertStatus::New => &[],
            AlertStatus::Queued => &[AlertStatus::New],
            AlertStatus::Analyzed => {
                &[AlertStatus::New, AlertStatus::Queued, AlertStatus::Analyzed]
            }
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::New => write!(f, "new"),
            AlertStatus::Queued => write!(f, "queued"),
            AlertStatus::Analyzed => write!(f, "analyzed"),
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(AlertStatus::New),
            "queued" => Ok(AlertStatus::Queued),
            "analyzed" => Ok(AlertStatus::Analyzed),
            _ => Err(anyhow::anyhow!("Invalid alert status: {}", s)),
        }
    }
}

/// Results of the external analysis step
///
/// The four fields are set together on the analyzed transition; an alert
/// either carries the whole block or none of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrichment {
    /// Severity predicted by the analysis model
    pub predicted_severity: String,
    /// Numeric risk score, 0.0 to 1.0
    pub risk_score: f64,
    /// Recommended response action
    pub recommended_action: String,
    /// Version of the model that produced these results
    pub ai_model_version: String,
}

/// A security alert received from a SIEM or other source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// Unique identifier; generated at ingestion when blank
    #[serde(default)]
    pub id: String,
    /// Originating system, e.g. "Splunk", "CrowdStrike"
    pub source: String,
    /// When the alert was generated at the source
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Severity label, e.g. "low", "high", "critical"
    pub severity: String,
    /// Category label, e.g. "Malware", "Suspicious Login"
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default = "default_status")]
    pub status: AlertStatus,
    /// Assigned by the store at insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Present only after analysis
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
}

fn default_status() -> AlertStatus {
    AlertStatus::New
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_happy_path_transitions() {
        assert!(AlertStatus::New.can_transition_to(AlertStatus::Queued));
        assert!(AlertStatus::Queued.can_transition_to(AlertStatus::Analyzed));
        // queued is never persisted, so the store writes analyzed over new
        assert!(AlertStatus::New.can_transition_to(AlertStatus::Analyzed));
    }

    #[test]
    fn test_status_never_regresses() {
        assert!(!AlertStatus::Analyzed.can_transition_to(AlertStatus::New));
        assert!(!AlertStatus::Analyzed.can_transition_to(AlertStatus::Queued));
        assert!(!AlertStatus::Queued.can_transition_to(AlertStatus::New));
        assert!(!AlertStatus::New.can_transition_to(AlertStatus::New));
    }

    #[test]
    fn test_analyzed_is_repeatable() {
        assert!(AlertStatus::Analyzed.can_transition_to(AlertStatus::Analyzed));
        assert!(AlertStatus::allowed_predecessors(AlertStatus::Analyzed)
            .contains(&AlertStatus::Analyzed));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [AlertStatus::New, AlertStatus::Queued, AlertStatus::Analyzed] {
            assert_eq!(AlertStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert!(AlertStatus::from_str("resolved").is_err());
    }

    #[test]
    fn test_alert_defaults_on_minimal_input() {
        let alert: Alert =
            serde_json::from_str(r#"{"source":"Splunk","severity":"high","category":"Malware"}"#)
                .unwrap();
        assert_eq!(alert.id, "");
        assert_eq!(alert.status, AlertStatus::New);
        assert!(alert.enrichment.is_none());
        assert!(alert.created_at.is_none());
    }

    #[test]
    fn test_enrichment_block_all_or_nothing() {
        let json = r#"{
            "id": "a-1",
            "source": "Elastic",
            "severity": "high",
            "category": "Malware",
            "status": "analyzed",
            "predicted_severity": "critical",
            "risk_score": 0.95,
            "recommended_action": "Quarantine host",
            "ai_model_version": "v1.0.0"
        }"#;
        let alert: Alert = serde_json::from_str(json).unwrap();
        let enrichment = alert.enrichment.expect("enrichment block present");
        assert_eq!(enrichment.predicted_severity, "critical");
        assert_eq!(enrichment.risk_score, 0.95);

        // No enrichment fields at all decodes to None
        let bare: Alert =
            serde_json::from_str(r#"{"id":"a-2","source":"x","severity":"low","category":"c"}"#)
                .unwrap();
        assert!(bare.enrichment.is_none());
    }

    #[test]
    fn test_queue_payload_round_trip() {
        let alert: Alert = serde_json::from_str(
            r#"{
                "id": "alert-42",
                "source": "CrowdStrike",
                "timestamp": "2026-08-01T12:00:00Z",
                "severity": "critical",
                "category": "Data Exfiltration",
                "title": "Large outbound transfer",
                "description": "10GB to unknown host",
                "source_ip": "10.0.0.5",
                "hostname": "db-01",
                "status": "new"
            }"#,
        )
        .unwrap();

        let payload = serde_json::to_vec(&alert).unwrap();
        let decoded: Alert = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, alert);
    }
}
