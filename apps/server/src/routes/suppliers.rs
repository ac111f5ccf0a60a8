//! Supplier endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use vendra_core::{validation, CoreError, Supplier};
use vendra_db::repository::generate_id;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::{Actor, LimitQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSupplier {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<ApiResponse<Vec<Supplier>>, ApiError> {
    let suppliers = state.db.suppliers().list(query.limit()).await?;
    Ok(ApiResponse::ok(suppliers))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    axum::Json(body): axum::Json<CreateSupplier>,
) -> Result<(StatusCode, ApiResponse<Supplier>), ApiError> {
    validation::validate_name(&body.name).map_err(CoreError::from)?;

    let supplier = Supplier {
        id: generate_id(),
        name: body.name,
        phone: body.phone,
        email: body.email,
        address: body.address,
        created_at: Utc::now(),
    };
    state.db.suppliers().insert(&supplier).await?;

    state
        .db
        .audit()
        .record_best_effort(
            &actor.0,
            "suppliers",
            "create",
            &format!("created supplier {} ({})", supplier.name, supplier.id),
        )
        .await;

    Ok((StatusCode::CREATED, ApiResponse::ok(supplier)))
}
