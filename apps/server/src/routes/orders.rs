//! Order endpoints: the transactional heart of the API.
//!
//! Creation, payments, and returns all delegate to the vendra-db services;
//! the handlers only translate JSON to service inputs and back. Client
//! totals never reach the services: totals are recomputed from the lines.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use vendra_core::{
    CoreError, Order, OrderItem, OrderStatus, OrderType, Payment, PaymentMethod, PaymentStatus,
    ReturnRecord, ReturnType,
};
use vendra_db::service::order::{CreatedOrder, NewOrder, NewOrderLine};
use vendra_db::service::payment::NewPayment;
use vendra_db::service::returns::{NewReturn, ProcessedReturn};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::{Actor, LimitQuery};
use crate::state::AppState;

// =============================================================================
// Request / Response Bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub order_type: OrderType,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub supplier_id: Option<String>,
    pub items: Vec<OrderLineBody>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineBody {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignCourierBody {
    pub courier_id: String,
    pub tracking_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentBody {
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub channel: Option<String>,
    pub txn_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReturnBody {
    pub reason: String,
    pub amount_cents: Option<i64>,
    pub return_type: Option<ReturnType>,
}

/// Full order view: header plus everything hanging off it.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
    pub returns: Vec<ReturnRecord>,
    pub total_paid_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct RecordedPayment {
    pub payment: Payment,
    pub payment_status: PaymentStatus,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    axum::Json(body): axum::Json<CreateOrderBody>,
) -> Result<(StatusCode, ApiResponse<CreatedOrder>), ApiError> {
    let input = NewOrder {
        order_type: body.order_type,
        customer_id: body.customer_id,
        customer_name: body.customer_name,
        customer_phone: body.customer_phone,
        supplier_id: body.supplier_id,
        lines: body
            .items
            .into_iter()
            .map(|line| NewOrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
            })
            .collect(),
    };

    let created = state.orders.create_order(input, &actor.0).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(created, "Order created"),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<ApiResponse<Vec<Order>>, ApiError> {
    let orders = state.db.orders().list(query.limit()).await?;
    Ok(ApiResponse::ok(orders))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<OrderDetail>, ApiError> {
    let repo = state.db.orders();

    let order = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::OrderNotFound(id.clone())))?;
    let items = repo.get_items(&id).await?;
    let payments = repo.get_payments(&id).await?;
    let returns = repo.get_returns(&id).await?;
    let total_paid_cents = repo.total_paid(&id).await?;

    Ok(ApiResponse::ok(OrderDetail {
        order,
        items,
        payments,
        returns,
        total_paid_cents,
    }))
}

pub async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<UpdateStatusBody>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order = state
        .orders
        .update_status(&id, body.status, &actor.0)
        .await?;
    Ok(ApiResponse::ok(order))
}

pub async fn assign_courier(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<AssignCourierBody>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order = state
        .orders
        .assign_courier(&id, &body.courier_id, &body.tracking_id, &actor.0)
        .await?;
    Ok(ApiResponse::ok(order))
}

pub async fn record_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<RecordPaymentBody>,
) -> Result<(StatusCode, ApiResponse<RecordedPayment>), ApiError> {
    let input = NewPayment {
        order_id: id,
        amount_cents: body.amount_cents,
        method: body.method,
        channel: body.channel,
        txn_ref: body.txn_ref,
    };

    let (payment, payment_status) = state.payments.record_payment(input, &actor.0).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(
            RecordedPayment {
                payment,
                payment_status,
            },
            "Payment recorded",
        ),
    ))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Payment>>, ApiError> {
    let payments = state.payments.list_for_order(&id).await?;
    Ok(ApiResponse::ok(payments))
}

pub async fn create_return(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<CreateReturnBody>,
) -> Result<(StatusCode, ApiResponse<ProcessedReturn>), ApiError> {
    if body.reason.trim().is_empty() {
        return Err(ApiError::bad_request("reason is required"));
    }

    let input = NewReturn {
        order_id: id,
        reason: body.reason,
        amount_cents: body.amount_cents,
        return_type: body.return_type,
    };

    let processed = state.returns.create_return(input, &actor.0).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok_with_message(processed, "Return processed"),
    ))
}
