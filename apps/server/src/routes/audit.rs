//! Audit trail endpoint (read-only; entries are written by the services).

use axum::extract::{Query, State};

use vendra_core::AuditLog;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::LimitQuery;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<ApiResponse<Vec<AuditLog>>, ApiError> {
    let entries = state.db.audit().list(query.limit()).await?;
    Ok(ApiResponse::ok(entries))
}
