//! HTTP ingestion and query API

use crate::error::VigilError;
use crate::models::{Alert, AlertStatus};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

/// Query parameters for listing alerts
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Ingest a new alert: store it, then hand it to the queue.
///
/// Responds 202 once the alert is saved; a publish failure after a
/// successful save still responds 202 with a degraded message, since the
/// record exists and only the analysis step is delayed.
async fn create_alert(
    State(state): State<AppState>,
    Json(mut alert): Json<Alert>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, String)> {
    if alert.id.is_empty() {
        alert.id = Uuid::new_v4().to_string();
    }
    alert.status = AlertStatus::New;
    alert.enrichment = None;

    if let Err(e) = state.store.create(&mut alert).await {
        return match e {
            VigilError::Duplicate(id) => {
                tracing::warn!("Rejected duplicate alert {}", id);
                Err((
                    StatusCode::CONFLICT,
                    format!("Alert already exists: {}", id),
                ))
            }
            e => {
                let msg = format!("Failed to store alert: {}", e);
                tracing::error!("{}", msg);
                Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
            }
        };
    }

    let payload = match serde_json::to_vec(&alert) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to serialize alert {} for publishing: {}", alert.id, e);
            return Ok(degraded_response(&alert.id));
        }
    };

    match state.publisher.publish(&alert.id, &payload) {
        Ok(()) => {
            tracing::info!("Received, saved, and published alert {}", alert.id);
            Ok((
                StatusCode::ACCEPTED,
                Json(serde_json::json!({
                    "message": "Alert received, saved, and published for processing",
                    "alert_id": alert.id,
                })),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to publish alert {}: {}", alert.id, e);
            Ok(degraded_response(&alert.id))
        }
    }
}

// The alert is durable even when the queue hand-off fails; the caller is
// told so rather than given an error for a request that partially succeeded.
fn degraded_response(alert_id: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "Alert received and saved, but failed to publish for processing",
            "alert_id": alert_id,
        })),
    )
}

/// List alerts, newest first, with clamped pagination
async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Alert>>, (StatusCode, String)> {
    let alerts = state
        .store
        .list(query.limit.unwrap_or(DEFAULT_PAGE), query.offset.unwrap_or(0))
        .await
        .map_err(|e| {
            let msg = format!("Failed to retrieve alerts: {}", e);
            tracing::error!("{}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, msg)
        })?;

    Ok(Json(alerts))
}

const DEFAULT_PAGE: i64 = 10;

/// Fetch a single alert by identifier
async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Alert>, (StatusCode, String)> {
    let alert = state.store.get(&id).await.map_err(|e| {
        let msg = format!("Failed to retrieve alert {}: {}", id, e);
        tracing::error!("{}", msg);
        (StatusCode::INTERNAL_SERVER_ERROR, msg)
    })?;

    match alert {
        Some(alert) => Ok(Json(alert)),
        None => Err((StatusCode::NOT_FOUND, "Alert not found".to_string())),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "vigil",
    }))
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/alerts", axum::routing::post(create_alert).get(list_alerts))
        .route("/alerts/:id", get(get_alert))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
