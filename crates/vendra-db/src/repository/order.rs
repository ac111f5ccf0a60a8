//! # Order Repository
//!
//! Read-side database operations for orders, their items, payments, and
//! return records.
//!
//! ## Where Are the Writes?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order/item/payment/return WRITES are multi-statement and must share   │
//! │  one transaction with their stock and status effects. They live in     │
//! │  the service layer:                                                    │
//! │                                                                        │
//! │    service::order::OrderService::create_order                          │
//! │    service::payment::PaymentService::record_payment                    │
//! │    service::returns::ReturnService::create_return                      │
//! │                                                                        │
//! │  This repository only answers questions about committed state.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;

use crate::error::DbResult;
use vendra_core::{Order, OrderItem, Payment, ReturnRecord};

const ORDER_COLUMNS: &str = r#"
    id, order_type, order_date, customer_id, supplier_id,
    total_cents, status, payment_status,
    courier_id, tracking_id, confirmed_by,
    created_at, updated_at
"#;

/// Repository for order read operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists orders, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity,
                   unit_price_cents, line_total_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all payments for an order, most recent first.
    pub async fn get_payments(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, amount_cents, method, channel, txn_ref,
                   status, paid_at, created_at
            FROM payments
            WHERE order_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sum of COMPLETED payment amounts for an order.
    ///
    /// NOTE: the payment service recomputes this inside its own transaction
    /// before every insert; this pool-level read is for display only and
    /// must not be used to guard a write.
    pub async fn total_paid(&self, order_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents)
            FROM payments
            WHERE order_id = ?1 AND status = 'completed'
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }

    /// Gets all return records for an order, most recent first.
    pub async fn get_returns(&self, order_id: &str) -> DbResult<Vec<ReturnRecord>> {
        let returns = sqlx::query_as::<_, ReturnRecord>(
            r#"
            SELECT id, order_id, return_type, amount_cents, reason, created_at
            FROM returns
            WHERE order_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(returns)
    }
}
