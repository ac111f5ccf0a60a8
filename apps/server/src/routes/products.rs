//! Product catalogue endpoints, plus manual stock adjustment and the
//! low-stock report.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use vendra_core::{validation, Product, ProductStatus, StockLevel};
use vendra_db::repository::product::{new_product, ProductWithStock};
use vendra_db::service::inventory::{LowStockItem, StockAdjustment};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::{Actor, LimitQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub category_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub initial_stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: String,
    pub category_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub min_stock: i64,
    pub status: ProductStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustStockBody {
    Set { quantity: i64, reason: String },
    Delta { delta: i64, reason: String },
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<ApiResponse<Vec<ProductWithStock>>, ApiError> {
    let products = state.db.products().list_with_stock(query.limit()).await?;
    Ok(ApiResponse::ok(products))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::from(vendra_core::CoreError::ProductNotFound(id)))?;
    Ok(ApiResponse::ok(product))
}

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    axum::Json(body): axum::Json<CreateProduct>,
) -> Result<(StatusCode, ApiResponse<Product>), ApiError> {
    validation::validate_name(&body.name).map_err(vendra_core::CoreError::from)?;
    validation::validate_price_cents(body.sale_price_cents)
        .map_err(vendra_core::CoreError::from)?;
    validation::validate_price_cents(body.purchase_price_cents)
        .map_err(vendra_core::CoreError::from)?;
    if body.initial_stock < 0 {
        return Err(ApiError::bad_request("initial_stock must not be negative"));
    }

    let product = new_product(
        &body.name,
        body.category_id,
        body.purchase_price_cents,
        body.sale_price_cents,
        body.min_stock,
    );
    state.db.products().insert(&product, body.initial_stock).await?;

    state
        .db
        .audit()
        .record_best_effort(
            &actor.0,
            "products",
            "create",
            &format!("created product {} ({})", product.name, product.id),
        )
        .await;

    Ok((StatusCode::CREATED, ApiResponse::ok(product)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<UpdateProduct>,
) -> Result<ApiResponse<Product>, ApiError> {
    validation::validate_name(&body.name).map_err(vendra_core::CoreError::from)?;

    let existing = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::from(vendra_core::CoreError::ProductNotFound(id.clone())))?;

    let product = Product {
        name: body.name,
        category_id: body.category_id,
        purchase_price_cents: body.purchase_price_cents,
        sale_price_cents: body.sale_price_cents,
        min_stock: body.min_stock,
        status: body.status,
        ..existing
    };
    state.db.products().update(&product).await?;

    state
        .db
        .audit()
        .record_best_effort(
            &actor.0,
            "products",
            "update",
            &format!("updated product {}", product.id),
        )
        .await;

    Ok(ApiResponse::ok(product))
}

pub async fn archive(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    state.db.products().archive(&id).await?;

    state
        .db
        .audit()
        .record_best_effort(
            &actor.0,
            "products",
            "archive",
            &format!("archived product {}", id),
        )
        .await;

    Ok(ApiResponse::ok_with_message((), "Product archived"))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<AdjustStockBody>,
) -> Result<ApiResponse<StockLevel>, ApiError> {
    let (adjustment, reason) = match body {
        AdjustStockBody::Set { quantity, reason } => (StockAdjustment::Set(quantity), reason),
        AdjustStockBody::Delta { delta, reason } => (StockAdjustment::Delta(delta), reason),
    };

    let level = state
        .inventory
        .adjust_stock(&id, adjustment, &reason, &actor.0)
        .await?;

    Ok(ApiResponse::ok(level))
}

pub async fn low_stock(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<LowStockItem>>, ApiError> {
    let items = state.inventory.low_stock().await?;
    Ok(ApiResponse::ok(items))
}
