//! # Payment Service
//!
//! Records payments against orders and keeps the derived `payment_status`
//! column consistent with the payment rows.
//!
//! ## The Payment Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   ├── re-read order total        (never trust caller state)            │
//! │   ├── re-read Σ completed payments on the same connection              │
//! │   ├── paid + amount > total?  → ROLLBACK with remaining balance        │
//! │   ├── insert payment row         (append-only, COMPLETED)              │
//! │   └── payment_status ← derive(paid + amount, total), persisted         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Two concurrent payments cannot jointly overpay: each one re-reads the
//! paid sum inside its own transaction, and SQLite serializes the writes.

use chrono::Utc;
use tracing::{debug, info};

use crate::pool::Database;
use crate::repository::generate_id;
use crate::service::{OpsError, OpsResult};
use vendra_core::{
    validation, CoreError, Money, Order, Payment, PaymentMethod, PaymentState, PaymentStatus,
};

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub channel: Option<String>,
    pub txn_ref: Option<String>,
}

/// Transactional payment operations.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    /// Creates a new PaymentService.
    pub fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Records a payment and re-derives the order's payment status, both in
    /// one transaction.
    ///
    /// ## Errors
    /// - [`CoreError::OrderNotFound`] - unknown order id
    /// - [`CoreError::PaymentExceedsBalance`] - the amount would push the
    ///   completed-payment sum past the order total; carries the remaining
    ///   payable balance (zero for an already-paid order)
    pub async fn record_payment(
        &self,
        input: NewPayment,
        actor_id: &str,
    ) -> OpsResult<(Payment, PaymentStatus)> {
        validation::validate_payment_amount(input.amount_cents)?;

        let mut tx = self.db.pool().begin().await.map_err(OpsError::from)?;

        // Re-read inside the transaction; the caller's view may be stale.
        let total_cents: Option<i64> =
            sqlx::query_scalar("SELECT total_cents FROM orders WHERE id = ?1")
                .bind(&input.order_id)
                .fetch_optional(&mut *tx)
                .await?;

        let total_cents =
            total_cents.ok_or_else(|| CoreError::OrderNotFound(input.order_id.clone()))?;

        let paid_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)
            FROM payments
            WHERE order_id = ?1 AND status = 'completed'
            "#,
        )
        .bind(&input.order_id)
        .fetch_one(&mut *tx)
        .await?;

        let total = Money::from_cents(total_cents);
        let paid = Money::from_cents(paid_cents);
        let amount = Money::from_cents(input.amount_cents);

        if paid + amount > total {
            let remaining = total.remaining_after(paid);
            debug!(
                order_id = %input.order_id,
                amount = %amount,
                remaining = %remaining,
                "Payment rejected: exceeds remaining balance"
            );
            return Err(CoreError::PaymentExceedsBalance {
                order_id: input.order_id.clone(),
                amount_cents: input.amount_cents,
                remaining_cents: remaining.cents(),
            }
            .into());
        }

        let now = Utc::now();
        let payment = Payment {
            id: generate_id(),
            order_id: input.order_id.clone(),
            amount_cents: input.amount_cents,
            method: input.method,
            channel: input.channel.clone(),
            txn_ref: input.txn_ref.clone(),
            status: PaymentState::Completed,
            paid_at: now,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, amount_cents, method,
                channel, txn_ref, status, paid_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.amount_cents)
        .bind(payment.method)
        .bind(&payment.channel)
        .bind(&payment.txn_ref)
        .bind(payment.status)
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        let status = PaymentStatus::derive(paid + amount, total);

        sqlx::query("UPDATE orders SET payment_status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&input.order_id)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(OpsError::from)?;

        info!(
            order_id = %input.order_id,
            amount = %amount,
            status = ?status,
            "Payment recorded"
        );

        self.db
            .audit()
            .record_best_effort(
                actor_id,
                "payments",
                "create",
                &format!(
                    "recorded {:?} payment of {} on order {} (now {:?})",
                    payment.method, amount, input.order_id, status
                ),
            )
            .await;

        Ok((payment, status))
    }

    /// Lists an order's payments, newest first.
    pub async fn list_for_order(&self, order_id: &str) -> OpsResult<Vec<Payment>> {
        // Surface an unknown order id instead of an empty list.
        self.require_order(order_id).await?;
        Ok(self.db.orders().get_payments(order_id).await?)
    }

    async fn require_order(&self, order_id: &str) -> OpsResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
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
    use vendra_core::OrderType;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_order(db: &Database, total_cents: i64) -> String {
        let product = new_product("Widget", None, 5_000, total_cents, 2);
        db.products().insert(&product, 50).await.unwrap();

        let created = OrderService::new(db.clone())
            .create_order(
                NewOrder {
                    order_type: OrderType::Sale,
                    customer_id: None,
                    customer_name: Some("Walk-in".to_string()),
                    customer_phone: Some("0300-1111111".to_string()),
                    supplier_id: None,
                    lines: vec![NewOrderLine {
                        product_id: product.id,
                        quantity: 1,
                        unit_price_cents: total_cents,
                    }],
                },
                "tester",
            )
            .await
            .unwrap();

        created.order.id
    }

    fn cash(order_id: &str, amount_cents: i64) -> NewPayment {
        NewPayment {
            order_id: order_id.to_string(),
            amount_cents,
            method: PaymentMethod::Cash,
            channel: None,
            txn_ref: None,
        }
    }

    #[tokio::test]
    async fn test_partial_then_full_payment() {
        let db = test_db().await;
        let order_id = seed_order(&db, 30_000).await;
        let svc = PaymentService::new(db.clone());

        let (_, status) = svc.record_payment(cash(&order_id, 10_000), "tester").await.unwrap();
        assert_eq!(status, PaymentStatus::Partial);

        let (_, status) = svc.record_payment(cash(&order_id, 20_000), "tester").await.unwrap();
        assert_eq!(status, PaymentStatus::Paid);

        // The derived status is persisted on the order row
        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(db.orders().total_paid(&order_id).await.unwrap(), 30_000);
    }

    #[tokio::test]
    async fn test_overpayment_rejected_with_remaining() {
        let db = test_db().await;
        let order_id = seed_order(&db, 30_000).await;
        let svc = PaymentService::new(db.clone());

        svc.record_payment(cash(&order_id, 25_000), "tester").await.unwrap();

        let err = svc
            .record_payment(cash(&order_id, 10_000), "tester")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::PaymentExceedsBalance {
                remaining_cents: 5_000,
                ..
            })
        ));

        // Rejected payment leaves no row and no status change
        assert_eq!(db.orders().total_paid(&order_id).await.unwrap(), 25_000);
        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Partial);
    }

    #[tokio::test]
    async fn test_payment_on_paid_order_reports_zero_remaining() {
        let db = test_db().await;
        let order_id = seed_order(&db, 30_000).await;
        let svc = PaymentService::new(db.clone());

        svc.record_payment(cash(&order_id, 30_000), "tester").await.unwrap();

        let err = svc
            .record_payment(cash(&order_id, 1), "tester")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::PaymentExceedsBalance {
                remaining_cents: 0,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_exact_payment_sets_paid() {
        let db = test_db().await;
        let order_id = seed_order(&db, 30_000).await;
        let svc = PaymentService::new(db.clone());

        let (_, status) = svc.record_payment(cash(&order_id, 30_000), "tester").await.unwrap();
        assert_eq!(status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_unknown_order_rejected() {
        let db = test_db().await;
        let svc = PaymentService::new(db.clone());

        let err = svc
            .record_payment(cash("missing", 100), "tester")
            .await
            .unwrap_err();

        assert!(matches!(err, OpsError::Core(CoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let db = test_db().await;
        let order_id = seed_order(&db, 30_000).await;
        let svc = PaymentService::new(db.clone());

        let err = svc.record_payment(cash(&order_id, 0), "tester").await.unwrap_err();
        assert!(matches!(err, OpsError::Core(CoreError::Validation(_))));
    }
}
