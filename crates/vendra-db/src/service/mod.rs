//! # Transaction Services
//!
//! The multi-step business flows of Vendra, each executed as ONE SQLite
//! transaction: all writes visible, or none.
//!
//! ## The Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Transaction Services                               │
//! │                                                                         │
//! │  OrderService::create_order          PaymentService::record_payment    │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │ BEGIN                    │        │ BEGIN                    │      │
//! │  │  insert order header     │        │  re-read order total     │      │
//! │  │  insert each item        │        │  re-read paid sum        │      │
//! │  │  stock ± per line        │        │  overpay? → ROLLBACK     │      │
//! │  │ COMMIT                   │        │  insert payment          │      │
//! │  └──────────────────────────┘        │  derive payment_status   │      │
//! │                                      │ COMMIT                   │      │
//! │  ReturnService::create_return        └──────────────────────────┘      │
//! │  ┌──────────────────────────┐                                          │
//! │  │ BEGIN                    │        InventoryService::adjust_stock    │
//! │  │  insert return row       │        ┌──────────────────────────┐      │
//! │  │  order → RETURNED        │        │ BEGIN                    │      │
//! │  │  reverse stock per item  │        │  read │ check ≥ 0 │ set  │      │
//! │  │ COMMIT                   │        │ COMMIT                   │      │
//! │  └──────────────────────────┘        └──────────────────────────┘      │
//! │                                                                         │
//! │  After every COMMIT: one best-effort audit write (failure swallowed).  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Actor Threading
//! Every mutating service call takes the acting user's id as an explicit
//! `actor_id` parameter - no ambient/global "current user" state - so the
//! whole module is testable without an HTTP layer.

pub mod inventory;
pub mod order;
pub mod payment;
pub mod returns;

use sqlx::SqliteConnection;
use thiserror::Error;

use crate::error::DbError;
use vendra_core::{CoreError, StockDirection};

// =============================================================================
// Service Error
// =============================================================================

/// Errors surfaced by the transaction services.
///
/// Business-rule violations ([`CoreError`]) and infrastructure failures
/// ([`DbError`]) both roll the enclosing transaction back; the distinction
/// matters to the caller (422 vs 500, retryable vs not).
#[derive(Debug, Error)]
pub enum OpsError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for OpsError {
    fn from(err: sqlx::Error) -> Self {
        OpsError::Db(err.into())
    }
}

impl From<vendra_core::ValidationError> for OpsError {
    fn from(err: vendra_core::ValidationError) -> Self {
        OpsError::Core(err.into())
    }
}

/// Result type for service operations.
pub type OpsResult<T> = Result<T, OpsError>;

// =============================================================================
// Shared Stock Mutation
// =============================================================================

/// Applies a signed stock movement to one product, inside the caller's
/// transaction.
///
/// Order creation and return processing both go through here with a
/// [`StockDirection`] from the shared lookup in vendra-core, so the two
/// paths cannot drift out of sync.
///
/// The read and the update run on the same transaction connection; the
/// database CHECK (quantity >= 0) remains as backstop behind the explicit
/// availability check.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
    direction: StockDirection,
) -> OpsResult<i64> {
    let available: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM stock_levels WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

    let available = available.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let delta = direction.delta(quantity);
    let new_quantity = available + delta;

    if new_quantity < 0 {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested: quantity,
        }
        .into());
    }

    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE stock_levels
        SET quantity = quantity + ?2, updated_at = ?3
        WHERE product_id = ?1
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Stock level", product_id).into());
    }

    Ok(new_quantity)
}
