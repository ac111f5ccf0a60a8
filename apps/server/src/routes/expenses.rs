//! Expense tracking endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use vendra_core::{validation, CoreError, Expense, Money};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::{Actor, LimitQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateExpense {
    pub category: String,
    pub amount_cents: i64,
    pub note: Option<String>,
    /// Defaults to now when absent.
    pub spent_at: Option<DateTime<Utc>>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<ApiResponse<Vec<Expense>>, ApiError> {
    let expenses = state.db.expenses().list(query.limit()).await?;
    Ok(ApiResponse::ok(expenses))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    axum::Json(body): axum::Json<CreateExpense>,
) -> Result<(StatusCode, ApiResponse<Expense>), ApiError> {
    validation::validate_name(&body.category).map_err(CoreError::from)?;
    validation::validate_payment_amount(body.amount_cents).map_err(CoreError::from)?;

    let spent_at = body.spent_at.unwrap_or_else(Utc::now);
    let expense = state
        .db
        .expenses()
        .insert(&body.category, body.amount_cents, body.note, spent_at)
        .await?;

    state
        .db
        .audit()
        .record_best_effort(
            &actor.0,
            "expenses",
            "create",
            &format!(
                "recorded {} expense of {}",
                expense.category,
                Money::from_cents(expense.amount_cents)
            ),
        )
        .await;

    Ok((StatusCode::CREATED, ApiResponse::ok(expense)))
}
