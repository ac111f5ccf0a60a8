//! # Audit Repository
//!
//! Best-effort audit trail writes.
//!
//! ## The One Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  An audit write must NEVER affect the outcome of the business          │
//! │  operation that triggered it.                                          │
//! │                                                                        │
//! │  business transaction ──► COMMIT ──► record_event()                   │
//! │                                          │                             │
//! │                                       Err(e)?                          │
//! │                                          │                             │
//! │                                      warn! + DISCARD                   │
//! │                                                                        │
//! │  The services call [`AuditRepository::record_best_effort`] strictly    │
//! │  AFTER their transaction commits.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::DbResult;
use crate::repository::generate_id;
use vendra_core::AuditLog;

/// Repository for audit log operations.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Writes an audit event. Fails like any other insert.
    pub async fn record(
        &self,
        actor_id: &str,
        category: &str,
        action: &str,
        details: &str,
    ) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, actor_id, category, action, details, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(generate_id())
        .bind(actor_id)
        .bind(category)
        .bind(action)
        .bind(details)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes an audit event, swallowing any failure.
    ///
    /// The error is logged to the operational log and discarded; the
    /// caller's success is already committed and stays committed.
    pub async fn record_best_effort(
        &self,
        actor_id: &str,
        category: &str,
        action: &str,
        details: &str,
    ) {
        if let Err(e) = self.record(actor_id, category, action, details).await {
            warn!(
                actor_id = %actor_id,
                category = %category,
                action = %action,
                error = %e,
                "Audit write failed; event dropped"
            );
        }
    }

    /// Lists audit events, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, actor_id, category, action, details, created_at
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
