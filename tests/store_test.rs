//! Integration tests for the alert store

use tempfile::NamedTempFile;
use vigil::models::{Alert, AlertStatus, Enrichment};
use vigil::store::AlertStore;
use vigil::VigilError;

fn sample_alert(id: &str) -> Alert {
    Alert {
        id: id.to_string(),
        source: "Splunk".to_string(),
        timestamp: chrono::Utc::now(),
        severity: "high".to_string(),
        category: "Malware".to_string(),
        title: "Suspicious binary".to_string(),
        description: "Unsigned executable launched from temp dir".to_string(),
        source_ip: Some("10.0.0.5".to_string()),
        target_ip: None,
        hostname: Some("ws-041".to_string()),
        username: None,
        file_hash: Some("deadbeef".to_string()),
        status: AlertStatus::New,
        created_at: None,
        enrichment: None,
    }
}

fn sample_enrichment() -> Enrichment {
    Enrichment {
        predicted_severity: "critical".to_string(),
        risk_score: 0.95,
        recommended_action: "Quarantine host".to_string(),
        ai_model_version: "v1.0.0".to_string(),
    }
}

async fn open_store(tmp: &NamedTempFile) -> AlertStore {
    AlertStore::open(tmp.path().to_str().unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_assigns_timestamp_and_get_round_trips() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    let mut alert = sample_alert("alert-1");
    store.create(&mut alert).await.unwrap();
    assert!(alert.created_at.is_some());

    let fetched = store.get("alert-1").await.unwrap().expect("alert stored");
    assert_eq!(fetched, alert);
    assert_eq!(fetched.status, AlertStatus::New);
    assert!(fetched.enrichment.is_none());
}

#[tokio::test]
async fn test_get_unknown_is_none_not_error() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    assert!(store.get("no-such-alert").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_is_strictly_insert_only() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    let mut alert = sample_alert("alert-dup");
    store.create(&mut alert).await.unwrap();

    let mut again = sample_alert("alert-dup");
    match store.create(&mut again).await {
        Err(VigilError::Duplicate(id)) => assert_eq!(id, "alert-dup"),
        other => panic!("expected Duplicate error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    for i in 0..3 {
        let mut alert = sample_alert(&format!("alert-{}", i));
        store.create(&mut alert).await.unwrap();
        // created_at drives the ordering; keep inserts distinguishable
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let alerts = store.list(10, 0).await.unwrap();
    let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["alert-2", "alert-1", "alert-0"]);
}

#[tokio::test]
async fn test_list_clamps_limit_and_offset() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    for i in 0..12 {
        let mut alert = sample_alert(&format!("alert-{:02}", i));
        store.create(&mut alert).await.unwrap();
    }

    // Non-positive limit falls back to 10
    assert_eq!(store.list(0, 0).await.unwrap().len(), 10);
    assert_eq!(store.list(-5, 0).await.unwrap().len(), 10);

    // Negative offset falls back to 0
    let from_start = store.list(3, 0).await.unwrap();
    let clamped = store.list(3, -1).await.unwrap();
    assert_eq!(from_start, clamped);

    // Sane values pass through
    assert_eq!(store.list(5, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_status_follows_transition_table() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    let mut alert = sample_alert("alert-t");
    store.create(&mut alert).await.unwrap();

    store
        .update_status("alert-t", AlertStatus::Queued)
        .await
        .unwrap();
    assert_eq!(
        store.get("alert-t").await.unwrap().unwrap().status,
        AlertStatus::Queued
    );

    // No regression
    match store.update_status("alert-t", AlertStatus::New).await {
        Err(VigilError::InvalidTransition { from, to }) => {
            assert_eq!(from, AlertStatus::Queued);
            assert_eq!(to, AlertStatus::New);
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }

    store
        .update_status("alert-t", AlertStatus::Analyzed)
        .await
        .unwrap();

    // Analyzed never goes back to queued
    assert!(matches!(
        store.update_status("alert-t", AlertStatus::Queued).await,
        Err(VigilError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_update_status_unknown_alert() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    match store.update_status("ghost", AlertStatus::Queued).await {
        Err(VigilError::NotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_with_enrichment_sets_all_fields() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    let mut alert = sample_alert("alert-e");
    store.create(&mut alert).await.unwrap();

    store
        .update_with_enrichment("alert-e", &sample_enrichment())
        .await
        .unwrap();

    let fetched = store.get("alert-e").await.unwrap().unwrap();
    assert_eq!(fetched.status, AlertStatus::Analyzed);
    assert_eq!(fetched.enrichment, Some(sample_enrichment()));
}

#[tokio::test]
async fn test_update_with_enrichment_is_idempotent() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    let mut alert = sample_alert("alert-i");
    store.create(&mut alert).await.unwrap();

    let enrichment = sample_enrichment();
    store
        .update_with_enrichment("alert-i", &enrichment)
        .await
        .unwrap();
    let once = store.get("alert-i").await.unwrap().unwrap();

    // Applying the same write again produces the same row
    store
        .update_with_enrichment("alert-i", &enrichment)
        .await
        .unwrap();
    let twice = store.get("alert-i").await.unwrap().unwrap();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_update_with_enrichment_unknown_alert() {
    let tmp = NamedTempFile::new().unwrap();
    let store = open_store(&tmp).await;

    match store
        .update_with_enrichment("ghost", &sample_enrichment())
        .await
    {
        Err(VigilError::NotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}
