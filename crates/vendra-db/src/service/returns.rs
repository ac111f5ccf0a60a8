//! # Return Service
//!
//! The single path by which an order reaches `RETURNED`.
//!
//! ## The Return Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   ├── load order             (already returned? → ROLLBACK)            │
//! │   ├── insert return row      (type, amount, reason)                    │
//! │   ├── order.status ← RETURNED                                          │
//! │   └── per item: stock move REVERSED relative to creation               │
//! │        a sale return restores what the sale took,                      │
//! │        a purchase return removes what the purchase added               │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Creation and reversal share one direction lookup in vendra-core, so
//! "create then return" always nets every touched stock level to zero.
//! A purchase return can still fail on insufficient stock (the purchased
//! goods may have been sold on in the meantime); that rolls the whole
//! return back.

use chrono::Utc;
use tracing::info;

use crate::pool::Database;
use crate::repository::generate_id;
use crate::service::{apply_stock_delta, OpsError, OpsResult};
use vendra_core::{
    CoreError, Money, Order, OrderItem, OrderStatus, OrderType, ReturnRecord, ReturnType,
};

/// Input for creating a return against an order.
#[derive(Debug, Clone)]
pub struct NewReturn {
    pub order_id: String,
    pub reason: String,
    /// Refund amount; defaults to the order total when absent.
    pub amount_cents: Option<i64>,
    /// Recorded label; defaults to the kind implied by the order type.
    /// The stock reversal is always keyed off the parent order's type,
    /// never off this label.
    pub return_type: Option<ReturnType>,
}

/// A processed return with the flipped order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProcessedReturn {
    pub return_record: ReturnRecord,
    pub order: Order,
}

/// Transactional return operations.
#[derive(Debug, Clone)]
pub struct ReturnService {
    db: Database,
}

impl ReturnService {
    /// Creates a new ReturnService.
    pub fn new(db: Database) -> Self {
        ReturnService { db }
    }

    /// Processes a return: return row + status flip + reversed stock
    /// movements, all in one transaction.
    ///
    /// ## Errors
    /// - [`CoreError::OrderNotFound`] - unknown order id
    /// - [`CoreError::OrderAlreadyReturned`] - the order is already RETURNED
    /// - [`CoreError::InsufficientStock`] - a purchase return would take a
    ///   stock level negative; the whole return rolls back
    pub async fn create_return(
        &self,
        input: NewReturn,
        actor_id: &str,
    ) -> OpsResult<ProcessedReturn> {
        let mut tx = self.db.pool().begin().await.map_err(OpsError::from)?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_type, order_date, customer_id, supplier_id,
                   total_cents, status, payment_status,
                   courier_id, tracking_id, confirmed_by,
                   created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(&input.order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(input.order_id.clone()))?;

        if order.status == OrderStatus::Returned {
            return Err(CoreError::OrderAlreadyReturned(order.id).into());
        }

        // The return row, not the status column, is the ground truth for
        // "has been returned": status is a derived flag that an admin edit
        // could in principle walk back, the row is append-only.
        let prior_returns: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM returns WHERE order_id = ?1")
                .bind(&order.id)
                .fetch_one(&mut *tx)
                .await?;
        if prior_returns > 0 {
            return Err(CoreError::OrderAlreadyReturned(order.id).into());
        }

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity,
                   unit_price_cents, line_total_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            "#,
        )
        .bind(&order.id)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now();
        let amount_cents = input.amount_cents.unwrap_or(order.total_cents);
        let return_record = ReturnRecord {
            id: generate_id(),
            order_id: order.id.clone(),
            return_type: input
                .return_type
                .unwrap_or_else(|| return_type_for(order.order_type)),
            amount_cents,
            reason: input.reason.clone(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO returns (id, order_id, return_type, amount_cents, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&return_record.id)
        .bind(&return_record.order_id)
        .bind(return_record.return_type)
        .bind(return_record.amount_cents)
        .bind(&return_record.reason)
        .bind(return_record.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&order.id)
            .bind(OrderStatus::Returned)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let direction = order.order_type.return_stock_direction();
        for item in &items {
            apply_stock_delta(&mut tx, &item.product_id, item.quantity, direction).await?;
        }

        tx.commit().await.map_err(OpsError::from)?;

        info!(
            order_id = %order.id,
            return_id = %return_record.id,
            amount = %Money::from_cents(amount_cents),
            "Return processed"
        );

        self.db
            .audit()
            .record_best_effort(
                actor_id,
                "returns",
                "create",
                &format!(
                    "processed {:?} of {} on order {}: {}",
                    return_record.return_type,
                    Money::from_cents(amount_cents),
                    order.id,
                    input.reason
                ),
            )
            .await;

        let order = Order {
            status: OrderStatus::Returned,
            updated_at: now,
            ..order
        };

        Ok(ProcessedReturn {
            return_record,
            order,
        })
    }
}

fn return_type_for(order_type: OrderType) -> ReturnType {
    match order_type {
        OrderType::Sale => ReturnType::SaleReturn,
        OrderType::Purchase => ReturnType::PurchaseReturn,
        // Returning a return order has no narrower label.
        OrderType::SaleReturn | OrderType::PurchaseReturn => ReturnType::Return,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::new_product;
    use crate::service::order::{NewOrder, NewOrderLine, OrderService};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, stock: i64) -> String {
        let product = new_product("Widget", None, 5_000, 10_000, 2);
        db.products().insert(&product, stock).await.unwrap();
        product.id
    }

    async fn place_order(db: &Database, order_type: OrderType, product_id: &str, qty: i64) -> String {
        OrderService::new(db.clone())
            .create_order(
                NewOrder {
                    order_type,
                    customer_id: None,
                    customer_name: Some("Walk-in".to_string()),
                    customer_phone: Some("0300-2222222".to_string()),
                    supplier_id: None,
                    lines: vec![NewOrderLine {
                        product_id: product_id.to_string(),
                        quantity: qty,
                        unit_price_cents: 10_000,
                    }],
                },
                "tester",
            )
            .await
            .unwrap()
            .order
            .id
    }

    #[tokio::test]
    async fn test_sale_return_restores_stock() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let order_id = place_order(&db, OrderType::Sale, &product_id, 3).await;

        let processed = ReturnService::new(db.clone())
            .create_return(
                NewReturn {
                    order_id: order_id.clone(),
                    reason: "damaged in transit".to_string(),
                    amount_cents: None,
                    return_type: None,
                },
                "tester",
            )
            .await
            .unwrap();

        assert_eq!(processed.order.status, OrderStatus::Returned);
        assert_eq!(processed.return_record.return_type, ReturnType::SaleReturn);
        // Defaulted to the order total
        assert_eq!(processed.return_record.amount_cents, 30_000);

        // Sale took 10 → 7; the return restores 10
        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);

        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Returned);
    }

    #[tokio::test]
    async fn test_purchase_return_removes_stock() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let order_id = place_order(&db, OrderType::Purchase, &product_id, 5).await;

        // Purchase raised 10 → 15
        ReturnService::new(db.clone())
            .create_return(
                NewReturn {
                    order_id,
                    reason: "wrong batch".to_string(),
                    amount_cents: Some(25_000),
                    return_type: None,
                },
                "tester",
            )
            .await
            .unwrap();

        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
    }

    #[tokio::test]
    async fn test_second_return_rejected() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let order_id = place_order(&db, OrderType::Sale, &product_id, 3).await;
        let svc = ReturnService::new(db.clone());

        svc.create_return(
            NewReturn {
                order_id: order_id.clone(),
                reason: "first".to_string(),
                amount_cents: None,
                return_type: None,
            },
            "tester",
        )
        .await
        .unwrap();

        let err = svc
            .create_return(
                NewReturn {
                    order_id,
                    reason: "second".to_string(),
                    amount_cents: None,
                    return_type: None,
                },
                "tester",
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::OrderAlreadyReturned(_))
        ));

        // Stock restored exactly once
        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
    }

    #[tokio::test]
    async fn test_second_return_rejected_even_after_status_walked_back() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let order_id = place_order(&db, OrderType::Sale, &product_id, 3).await;
        let svc = ReturnService::new(db.clone());

        svc.create_return(
            NewReturn {
                order_id: order_id.clone(),
                reason: "first".to_string(),
                amount_cents: None,
                return_type: None,
            },
            "tester",
        )
        .await
        .unwrap();

        // Force the status flag out of RETURNED behind the service's back;
        // the return row must still block a second pass.
        sqlx::query("UPDATE orders SET status = 'pending' WHERE id = ?1")
            .bind(&order_id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = svc
            .create_return(
                NewReturn {
                    order_id: order_id.clone(),
                    reason: "second".to_string(),
                    amount_cents: None,
                    return_type: None,
                },
                "tester",
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::OrderAlreadyReturned(_))
        ));

        // Sale took 10 → 7, the one return restored 10; no drift past that
        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
    }

    #[tokio::test]
    async fn test_purchase_return_blocked_when_goods_sold_on() {
        let db = test_db().await;
        let product_id = seed_product(&db, 0).await;
        // Purchase 5 in (0 → 5), then sell 4 of them (5 → 1)
        let purchase_id = place_order(&db, OrderType::Purchase, &product_id, 5).await;
        place_order(&db, OrderType::Sale, &product_id, 4).await;

        let err = ReturnService::new(db.clone())
            .create_return(
                NewReturn {
                    order_id: purchase_id.clone(),
                    reason: "supplier recall".to_string(),
                    amount_cents: None,
                    return_type: None,
                },
                "tester",
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::InsufficientStock {
                available: 1,
                requested: 5,
                ..
            })
        ));

        // The whole return rolled back: order untouched, no return row
        let order = db.orders().get_by_id(&purchase_id).await.unwrap().unwrap();
        assert_ne!(order.status, OrderStatus::Returned);
        assert!(db.orders().get_returns(&purchase_id).await.unwrap().is_empty());
    }
}
