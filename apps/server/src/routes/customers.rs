//! Customer endpoints. Order creation can also create customers on the
//! fly (find-or-create by phone); these handlers are the explicit surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use vendra_core::{validation, CoreError, Customer};
use vendra_db::repository::generate_id;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::{Actor, LimitQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<ApiResponse<Vec<Customer>>, ApiError> {
    let customers = state.db.customers().list(query.limit()).await?;
    Ok(ApiResponse::ok(customers))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Customer>, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::CustomerNotFound(id)))?;
    Ok(ApiResponse::ok(customer))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    axum::Json(body): axum::Json<CreateCustomer>,
) -> Result<(StatusCode, ApiResponse<Customer>), ApiError> {
    validation::validate_name(&body.name).map_err(CoreError::from)?;
    validation::validate_phone(&body.phone).map_err(CoreError::from)?;

    let customer = Customer {
        id: generate_id(),
        name: body.name,
        phone: body.phone,
        email: body.email,
        address: body.address,
        created_at: Utc::now(),
    };
    // Duplicate phone surfaces as a 422 with DUPLICATE_PHONE
    state.db.customers().insert(&customer).await?;

    state
        .db
        .audit()
        .record_best_effort(
            &actor.0,
            "customers",
            "create",
            &format!("created customer {} ({})", customer.name, customer.id),
        )
        .await;

    Ok((StatusCode::CREATED, ApiResponse::ok(customer)))
}
