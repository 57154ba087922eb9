//! SQLite-backed alert store
//!
//! Single `alerts` table. All mutations are identifier-scoped statements;
//! status transitions are enforced inside the `WHERE` clause of each update,
//! so the transition table holds even under concurrent writers.

use crate::error::{VigilError, VigilResult};
use crate::models::{Alert, AlertStatus, Enrichment};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

/// Default page size when the caller passes a non-positive limit
const DEFAULT_LIMIT: i64 = 10;

/// Persistent store for alert records
#[derive(Clone)]
pub struct AlertStore {
    pool: SqlitePool,
}

impl AlertStore {
    /// Open or create the alert database at the specified path.
    ///
    /// Uses WAL mode so the API handlers and the processor can share the
    /// database through their own pools.
    pub async fn open(path: &str) -> VigilResult<Self> {
        let db_url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite://{}", path)
        };

        let options = SqliteConnectOptions::from_str(&db_url)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY NOT NULL,
                source TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                severity TEXT NOT NULL,
                category TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                source_ip TEXT,
                target_ip TEXT,
                hostname TEXT,
                username TEXT,
                file_hash TEXT,
                status TEXT NOT NULL DEFAULT 'new',
                predicted_severity TEXT,
                risk_score REAL,
                recommended_action TEXT,
                ai_model_version TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        tracing::info!("Alert store initialized at {}", db_url);
        Ok(Self { pool })
    }

    /// Get the underlying pool (for advanced usage)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new alert and assign its creation timestamp.
    ///
    /// Strictly insert-only: a duplicate identifier is surfaced as
    /// [`VigilError::Duplicate`], never as an upsert. Callers that may
    /// redeliver ingestion events must dedupe on the identifier.
    pub async fn create(&self, alert: &mut Alert) -> VigilResult<()> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO alerts (
                id, source, timestamp, severity, category, title, description,
                source_ip, target_ip, hostname, username, file_hash, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&alert.id)
        .bind(&alert.source)
        .bind(alert.timestamp)
        .bind(&alert.severity)
        .bind(&alert.category)
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(&alert.source_ip)
        .bind(&alert.target_ip)
        .bind(&alert.hostname)
        .bind(&alert.username)
        .bind(&alert.file_hash)
        .bind(alert.status.to_string())
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                alert.created_at = Some(created_at);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(VigilError::Duplicate(alert.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Point lookup by identifier; absent is `Ok(None)`, not an error
    pub async fn get(&self, id: &str) -> VigilResult<Option<Alert>> {
        let row = sqlx::query("SELECT * FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_alert(&r)).transpose()
    }

    /// Paginated listing, newest first.
    ///
    /// A non-positive limit falls back to 10 and a negative offset to 0
    /// rather than being rejected.
    pub async fn list(&self, limit: i64, offset: i64) -> VigilResult<Vec<Alert>> {
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };
        let offset = offset.max(0);

        let rows = sqlx::query("SELECT * FROM alerts ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_alert).collect()
    }

    /// Partial update of the status column, guarded by the transition table.
    ///
    /// Fails with [`VigilError::NotFound`] when the alert does not exist and
    /// [`VigilError::InvalidTransition`] when it does but its current status
    /// does not permit the transition.
    pub async fn update_status(&self, id: &str, status: AlertStatus) -> VigilResult<()> {
        let predecessors = AlertStatus::allowed_predecessors(status);

        if !predecessors.is_empty() {
            let guard = predecessors
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");

            let result = sqlx::query(&format!(
                "UPDATE alerts SET status = ? WHERE id = ? AND status IN ({})",
                guard
            ))
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(());
            }
        }

        // Zero rows affected: distinguish a missing alert from an illegal
        // transition for the error message only. The guarded UPDATE above is
        // what actually enforces the table.
        match self.current_status(id).await? {
            Some(from) => Err(VigilError::InvalidTransition { from, to: status }),
            None => Err(VigilError::NotFound(id.to_string())),
        }
    }

    /// Write the analyzed transition: status plus all four enrichment fields
    /// in one statement.
    ///
    /// Safely repeatable: the same enrichment applied twice produces the same
    /// row, which is what makes queue redelivery harmless downstream of
    /// ingestion. Fails with [`VigilError::NotFound`] on zero rows affected.
    pub async fn update_with_enrichment(
        &self,
        id: &str,
        enrichment: &Enrichment,
    ) -> VigilResult<()> {
        let guard = AlertStatus::allowed_predecessors(AlertStatus::Analyzed)
            .iter()
            .map(|s| format!("'{}'", s))
            .collect::<Vec<_>>()
            .join(", ");

        let result = sqlx::query(&format!(
            r#"
            UPDATE alerts
            SET status = ?, predicted_severity = ?, risk_score = ?,
                recommended_action = ?, ai_model_version = ?
            WHERE id = ? AND status IN ({})
            "#,
            guard
        ))
        .bind(AlertStatus::Analyzed.to_string())
        .bind(&enrichment.predicted_severity)
        .bind(enrichment.risk_score)
        .bind(&enrichment.recommended_action)
        .bind(&enrichment.ai_model_version)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(VigilError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn current_status(&self, id: &str) -> VigilResult<Option<AlertStatus>> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM alerts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        status
            .map(|s| {
                AlertStatus::from_str(&s)
                    .map_err(|_| VigilError::Database(sqlx::Error::Decode(s.into())))
            })
            .transpose()
    }
}

// Helper to convert a SqliteRow to an Alert
fn row_to_alert(row: &SqliteRow) -> VigilResult<Alert> {
    let status_str: String = row.try_get("status")?;
    let status = AlertStatus::from_str(&status_str)
        .map_err(|_| VigilError::Database(sqlx::Error::Decode(status_str.into())))?;

    // Enrichment fields are written together, so presence of one means
    // presence of all.
    let predicted_severity: Option<String> = row.try_get("predicted_severity")?;
    let enrichment = match predicted_severity {
        Some(predicted_severity) => Some(Enrichment {
            predicted_severity,
            risk_score: row.try_get("risk_score")?,
            recommended_action: row.try_get("recommended_action")?,
            ai_model_version: row.try_get("ai_model_version")?,
        }),
        None => None,
    };

    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Alert {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        timestamp: row.try_get("timestamp")?,
        severity: row.try_get("severity")?,
        category: row.try_get("category")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        source_ip: row.try_get("source_ip")?,
        target_ip: row.try_get("target_ip")?,
        hostname: row.try_get("hostname")?,
        username: row.try_get("username")?,
        file_hash: row.try_get("file_hash")?,
        status,
        created_at: Some(created_at),
        enrichment,
    })
}
