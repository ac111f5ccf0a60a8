//! # Order Service
//!
//! Order creation (the stock-mutating transaction), direct status updates,
//! and courier assignment.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. VALIDATE (before any write)                                        │
//! │     └── non-empty lines, positive quantities, non-negative prices      │
//! │                                                                         │
//! │  2. RESOLVE PARTY (own small pre-step, NOT in the order transaction)   │
//! │     └── customer id verified, or find-or-create by name+phone          │
//! │                                                                         │
//! │  3. TRANSACTION                                                        │
//! │     ├── total = Σ qty × price  (client totals ignored)                 │
//! │     ├── insert order header   (PENDING / UNPAID)                       │
//! │     ├── insert each item row                                           │
//! │     └── stock ± per line      (sign from the shared direction lookup)  │
//! │        any failure → ROLLBACK, nothing persists                        │
//! │                                                                         │
//! │  4. AUDIT (after commit, best-effort, failure swallowed)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};

use crate::pool::Database;
use crate::repository::generate_id;
use crate::service::{apply_stock_delta, OpsError, OpsResult};
use vendra_core::{
    money::order_total, validation, CoreError, Money, Order, OrderItem, OrderStatus, OrderType,
    PaymentStatus,
};

// =============================================================================
// Inputs
// =============================================================================

/// One `{productId, quantity, price}` line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Input for order creation.
///
/// Exactly one of `customer_id` or `customer_name`+`customer_phone` is
/// expected for sale-side orders; purchase-side orders reference a
/// supplier instead.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_type: OrderType,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub supplier_id: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// A created order with its immutable item rows.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Order Service
// =============================================================================

/// Transactional order operations.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Creates an order atomically: header + items + stock movements.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyOrder`] - no lines; rejected before any write
    /// - [`CoreError::CustomerNotFound`] - a supplied customer id is unknown
    /// - [`CoreError::MissingCustomerInfo`] - sale order with neither id
    ///   nor name+phone
    /// - [`CoreError::ProductNotFound`] / [`CoreError::InsufficientStock`] -
    ///   raised inside the transaction; the whole order rolls back
    pub async fn create_order(&self, input: NewOrder, actor_id: &str) -> OpsResult<CreatedOrder> {
        // ---- 1. Validation, before anything touches the store ----
        if input.lines.is_empty() {
            return Err(CoreError::EmptyOrder.into());
        }
        for line in &input.lines {
            validation::validate_quantity(line.quantity)?;
            validation::validate_price_cents(line.unit_price_cents)?;
        }

        // ---- 2. Party resolution (its own small pre-step) ----
        let customer_id = self.resolve_customer(&input).await?;

        // ---- 3. The order transaction ----
        let total = order_total(
            &input
                .lines
                .iter()
                .map(|l| (l.quantity, l.unit_price_cents))
                .collect::<Vec<_>>(),
        );

        let now = Utc::now();
        let order = Order {
            id: generate_id(),
            order_type: input.order_type,
            order_date: now,
            customer_id,
            supplier_id: input.supplier_id.clone(),
            total_cents: total.cents(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            courier_id: None,
            tracking_id: None,
            confirmed_by: None,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %order.id, order_type = ?order.order_type, lines = input.lines.len(), "Creating order");

        let mut tx = self.db.pool().begin().await.map_err(OpsError::from)?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_type, order_date, customer_id, supplier_id,
                total_cents, status, payment_status,
                courier_id, tracking_id, confirmed_by,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&order.id)
        .bind(order.order_type)
        .bind(order.order_date)
        .bind(&order.customer_id)
        .bind(&order.supplier_id)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.courier_id)
        .bind(&order.tracking_id)
        .bind(&order.confirmed_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        let direction = input.order_type.stock_direction();
        let mut items = Vec::with_capacity(input.lines.len());

        for line in &input.lines {
            let item = OrderItem {
                id: generate_id(),
                order_id: order.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: Money::from_cents(line.unit_price_cents)
                    .multiply_quantity(line.quantity)
                    .cents(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, quantity,
                    unit_price_cents, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            apply_stock_delta(&mut tx, &line.product_id, line.quantity, direction).await?;

            items.push(item);
        }

        tx.commit().await.map_err(OpsError::from)?;

        info!(id = %order.id, total = %total, items = items.len(), "Order created");

        // ---- 4. Audit, strictly after commit ----
        self.db
            .audit()
            .record_best_effort(
                actor_id,
                "orders",
                "create",
                &format!(
                    "created {:?} order {} with {} item(s) totaling {}",
                    order.order_type,
                    order.id,
                    items.len(),
                    total
                ),
            )
            .await;

        Ok(CreatedOrder { order, items })
    }

    /// Directly updates an order's status (admin action, no stock effect).
    ///
    /// `Returned` is a terminal status and fenced off in both directions:
    /// it cannot be set here (only `ReturnService::create_return` reaches
    /// it, carrying the compensating stock adjustment), and an order that
    /// is already `Returned` cannot be moved back out. The exit check
    /// lives in the UPDATE's WHERE clause so there is no window between
    /// read and write.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        actor_id: &str,
    ) -> OpsResult<Order> {
        if !status.directly_settable() {
            return Err(CoreError::ForbiddenStatusTransition {
                status: format!("{:?}", status),
            }
            .into());
        }

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?2, confirmed_by = ?3, updated_at = ?4
            WHERE id = ?1 AND status != ?5
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(actor_id)
        .bind(now)
        .bind(OrderStatus::Returned)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            // Zero rows means either the order does not exist or it sits
            // in the terminal Returned state; tell the two apart.
            let existing = self.require_order(order_id).await?;
            return Err(CoreError::OrderAlreadyReturned(existing.id).into());
        }

        info!(id = %order_id, status = ?status, "Order status updated");

        self.db
            .audit()
            .record_best_effort(
                actor_id,
                "orders",
                "status",
                &format!("set order {} status to {:?}", order_id, status),
            )
            .await;

        self.require_order(order_id).await
    }

    /// Assigns a courier and tracking reference to an order.
    pub async fn assign_courier(
        &self,
        order_id: &str,
        courier_id: &str,
        tracking_id: &str,
        actor_id: &str,
    ) -> OpsResult<Order> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET courier_id = ?2, tracking_id = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(courier_id)
        .bind(tracking_id)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::OrderNotFound(order_id.to_string()).into());
        }

        self.db
            .audit()
            .record_best_effort(
                actor_id,
                "orders",
                "courier",
                &format!(
                    "assigned courier {} (tracking {}) to order {}",
                    courier_id, tracking_id, order_id
                ),
            )
            .await;

        self.require_order(order_id).await
    }

    /// Resolves the customer reference for a new order.
    ///
    /// Supplied id → must exist. Name+phone → find-or-create (lookup by
    /// phone, reuse if found, else insert; duplicate-key falls back to
    /// lookup). Sale orders with neither are rejected.
    async fn resolve_customer(&self, input: &NewOrder) -> OpsResult<Option<String>> {
        if let Some(id) = &input.customer_id {
            let customer = self
                .db
                .customers()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::CustomerNotFound(id.clone()))?;
            return Ok(Some(customer.id));
        }

        if let (Some(name), Some(phone)) = (&input.customer_name, &input.customer_phone) {
            validation::validate_name(name)?;
            validation::validate_phone(phone)?;
            let customer = self.db.customers().find_or_create(name, phone).await?;
            return Ok(Some(customer.id));
        }

        // Purchase-side orders track a supplier instead of a customer.
        if matches!(
            input.order_type,
            OrderType::Purchase | OrderType::PurchaseReturn
        ) {
            return Ok(None);
        }

        Err(CoreError::MissingCustomerInfo.into())
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

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, stock: i64) -> String {
        let product = new_product("Widget", None, 5_000, 10_000, 2);
        db.products().insert(&product, stock).await.unwrap();
        product.id
    }

    fn sale_lines(product_id: &str, qty: i64, price: i64) -> NewOrder {
        NewOrder {
            order_type: OrderType::Sale,
            customer_id: None,
            customer_name: Some("Walk-in".to_string()),
            customer_phone: Some("0300-0000000".to_string()),
            supplier_id: None,
            lines: vec![NewOrderLine {
                product_id: product_id.to_string(),
                quantity: qty,
                unit_price_cents: price,
            }],
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_computes_total() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let created = svc
            .create_order(sale_lines(&product_id, 3, 10_000), "tester")
            .await
            .unwrap();

        assert_eq!(created.order.total_cents, 30_000);
        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.order.payment_status, PaymentStatus::Unpaid);

        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 7);
    }

    #[tokio::test]
    async fn test_purchase_increments_stock() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let created = svc
            .create_order(
                NewOrder {
                    order_type: OrderType::Purchase,
                    customer_id: None,
                    customer_name: None,
                    customer_phone: None,
                    supplier_id: None,
                    lines: vec![NewOrderLine {
                        product_id: product_id.clone(),
                        quantity: 5,
                        unit_price_cents: 5_000,
                    }],
                },
                "tester",
            )
            .await
            .unwrap();

        assert_eq!(created.order.total_cents, 25_000);

        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 15);
    }

    #[tokio::test]
    async fn test_oversell_rejected_and_nothing_persists() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let err = svc
            .create_order(sale_lines(&product_id, 11, 10_000), "tester")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            })
        ));

        // Whole transaction rolled back: stock unchanged, no order rows
        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
        assert!(db.orders().list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multi_line_atomicity_on_unknown_product() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let mut input = sale_lines(&product_id, 3, 10_000);
        input.lines.push(NewOrderLine {
            product_id: "no-such-product".to_string(),
            quantity: 1,
            unit_price_cents: 100,
        });

        let err = svc.create_order(input, "tester").await.unwrap_err();
        assert!(matches!(
            err,
            OpsError::Core(CoreError::ProductNotFound(_)) | OpsError::Db(_)
        ));

        // First line's stock decrement must not survive
        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
        assert!(db.orders().list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let db = test_db().await;
        let svc = OrderService::new(db.clone());

        let err = svc
            .create_order(
                NewOrder {
                    order_type: OrderType::Sale,
                    customer_id: None,
                    customer_name: Some("X".to_string()),
                    customer_phone: Some("123".to_string()),
                    supplier_id: None,
                    lines: vec![],
                },
                "tester",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OpsError::Core(CoreError::EmptyOrder)));
    }

    #[tokio::test]
    async fn test_direct_status_update_records_actor() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let created = svc
            .create_order(sale_lines(&product_id, 1, 10_000), "tester")
            .await
            .unwrap();

        let updated = svc
            .update_status(&created.order.id, OrderStatus::Confirmed, "manager-1")
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.confirmed_by.as_deref(), Some("manager-1"));

        // Idempotent: same target status again is safe
        let again = svc
            .update_status(&created.order.id, OrderStatus::Confirmed, "manager-1")
            .await
            .unwrap();
        assert_eq!(again.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_direct_update_to_returned_is_forbidden() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let created = svc
            .create_order(sale_lines(&product_id, 1, 10_000), "tester")
            .await
            .unwrap();

        let err = svc
            .update_status(&created.order.id, OrderStatus::Returned, "tester")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::ForbiddenStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_returned_order_cannot_be_moved_back() {
        use crate::service::returns::{NewReturn, ReturnService};

        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = OrderService::new(db.clone());

        let created = svc
            .create_order(sale_lines(&product_id, 3, 10_000), "tester")
            .await
            .unwrap();

        ReturnService::new(db.clone())
            .create_return(
                NewReturn {
                    order_id: created.order.id.clone(),
                    reason: "changed mind".to_string(),
                    amount_cents: None,
                    return_type: None,
                },
                "tester",
            )
            .await
            .unwrap();

        let err = svc
            .update_status(&created.order.id, OrderStatus::Pending, "tester")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OpsError::Core(CoreError::OrderAlreadyReturned(_))
        ));

        let order = db.orders().get_by_id(&created.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Returned);
    }
}
