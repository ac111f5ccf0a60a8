//! Liveness endpoint: answers only when the database answers, and
//! reports the migration state for quick diagnostics.

use axum::extract::State;
use serde::Serialize;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub migrations_applied: usize,
    pub migrations_total: usize,
}

pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<HealthStatus>, ApiError> {
    if !state.db.health_check().await {
        return Err(ApiError::from(vendra_db::DbError::ConnectionFailed(
            "health probe query failed".to_string(),
        )));
    }

    let (total, applied) = vendra_db::migrations::migration_status(state.db.pool()).await?;

    Ok(ApiResponse::ok(HealthStatus {
        status: "ok",
        database: "ok",
        migrations_applied: applied,
        migrations_total: total,
    }))
}
