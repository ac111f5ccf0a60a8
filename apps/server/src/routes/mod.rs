//! # HTTP Routes
//!
//! Route table:
//! ```text
//! GET    /api/health
//!
//! GET    /api/products                 list with stock
//! POST   /api/products                 create
//! GET    /api/products/{id}            fetch one
//! PUT    /api/products/{id}            update metadata
//! DELETE /api/products/{id}            archive (soft delete)
//! POST   /api/products/{id}/stock      manual stock adjustment
//! GET    /api/inventory/low-stock      products at/below threshold
//!
//! GET    /api/customers                list
//! POST   /api/customers                create
//! GET    /api/customers/{id}           fetch one
//!
//! GET    /api/suppliers                list
//! POST   /api/suppliers                create
//!
//! POST   /api/orders                   create (items + stock, atomic)
//! GET    /api/orders                   list
//! GET    /api/orders/{id}              header + items + payments + returns
//! PATCH  /api/orders/{id}/status       direct status update
//! PATCH  /api/orders/{id}/courier      assign courier + tracking
//! POST   /api/orders/{id}/payments     record payment
//! GET    /api/orders/{id}/payments     list payments
//! POST   /api/orders/{id}/returns      process return
//!
//! GET    /api/expenses                 list
//! POST   /api/expenses                 record
//!
//! GET    /api/audit                    audit trail, newest first
//! ```
//!
//! Mutating endpoints take the acting user from the `x-actor-id` header
//! and thread it down to the services for the audit trail.

pub mod audit;
pub mod customers;
pub mod expenses;
pub mod health;
pub mod orders;
pub mod products;
pub mod suppliers;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/products/{id}",
            get(products::get_one)
                .put(products::update)
                .delete(products::archive),
        )
        .route("/api/products/{id}/stock", post(products::adjust_stock))
        .route("/api/inventory/low-stock", get(products::low_stock))
        .route(
            "/api/customers",
            get(customers::list).post(customers::create),
        )
        .route("/api/customers/{id}", get(customers::get_one))
        .route(
            "/api/suppliers",
            get(suppliers::list).post(suppliers::create),
        )
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/{id}", get(orders::get_one))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/orders/{id}/courier", patch(orders::assign_courier))
        .route(
            "/api/orders/{id}/payments",
            get(orders::list_payments).post(orders::record_payment),
        )
        .route("/api/orders/{id}/returns", post(orders::create_return))
        .route(
            "/api/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route("/api/audit", get(audit::list))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The acting user's id, taken from the `x-actor-id` header.
///
/// Required on every mutating endpoint so the audit trail names a real
/// actor rather than a placeholder.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request("x-actor-id header is required"))?;

        Ok(Actor(actor.to_string()))
    }
}

/// Default page size for list endpoints.
pub(crate) const DEFAULT_LIMIT: u32 = 100;

/// Common `?limit=` query parameter.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct LimitQuery {
    pub limit: Option<u32>,
}

impl LimitQuery {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(1_000)
    }
}
