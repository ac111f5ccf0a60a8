//! # Inventory Service
//!
//! Manual stock adjustments (stocktake corrections, breakage, shrinkage)
//! and low-stock reporting. Order-driven stock movement lives in the order
//! and return services; this is the only other writer of `stock_levels`.

use chrono::Utc;
use tracing::info;

use crate::pool::Database;
use crate::service::{OpsError, OpsResult};
use vendra_core::{CoreError, StockLevel};

/// A manual stock correction.
#[derive(Debug, Clone, Copy)]
pub enum StockAdjustment {
    /// Set the quantity to an absolute value (stocktake).
    Set(i64),
    /// Apply a signed delta (breakage, found stock).
    Delta(i64),
}

/// Manual inventory operations.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    /// Creates a new InventoryService.
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Applies a manual stock adjustment.
    ///
    /// The resulting quantity must be non-negative; a violating adjustment
    /// is rejected with the current availability so the caller can correct
    /// it. The audit entry names the reason, distinguishing manual
    /// corrections from order-driven movement.
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        adjustment: StockAdjustment,
        reason: &str,
        actor_id: &str,
    ) -> OpsResult<StockLevel> {
        let mut tx = self.db.pool().begin().await.map_err(OpsError::from)?;

        let available: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM stock_levels WHERE product_id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;

        let available =
            available.ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let new_quantity = match adjustment {
            StockAdjustment::Set(quantity) => quantity,
            StockAdjustment::Delta(delta) => available + delta,
        };

        if new_quantity < 0 {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available,
                requested: available - new_quantity,
            }
            .into());
        }

        let now = Utc::now();

        sqlx::query("UPDATE stock_levels SET quantity = ?2, updated_at = ?3 WHERE product_id = ?1")
            .bind(product_id)
            .bind(new_quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(OpsError::from)?;

        info!(
            product_id = %product_id,
            from = available,
            to = new_quantity,
            "Stock adjusted"
        );

        self.db
            .audit()
            .record_best_effort(
                actor_id,
                "inventory",
                "adjust",
                &format!(
                    "adjusted stock of product {} from {} to {}: {}",
                    product_id, available, new_quantity, reason
                ),
            )
            .await;

        Ok(StockLevel {
            product_id: product_id.to_string(),
            quantity: new_quantity,
            updated_at: now,
        })
    }

    /// Lists products at or below their reorder threshold.
    pub async fn low_stock(&self) -> OpsResult<Vec<LowStockItem>> {
        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT p.id AS product_id, p.name, p.min_stock,
                   COALESCE(s.quantity, 0) AS quantity
            FROM products p
            LEFT JOIN stock_levels s ON s.product_id = p.id
            WHERE p.status = 'active'
              AND COALESCE(s.quantity, 0) <= p.min_stock
            ORDER BY quantity ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await
        .map_err(OpsError::from)?;

        Ok(items)
    }
}

/// A product sitting at or below its reorder threshold.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct LowStockItem {
    pub product_id: String,
    pub name: String,
    pub min_stock: i64,
    pub quantity: i64,
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
        let product = new_product("Widget", None, 5_000, 10_000, 3);
        db.products().insert(&product, stock).await.unwrap();
        product.id
    }

    #[tokio::test]
    async fn test_set_and_delta_adjustments() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = InventoryService::new(db.clone());

        let level = svc
            .adjust_stock(&product_id, StockAdjustment::Set(25), "stocktake", "tester")
            .await
            .unwrap();
        assert_eq!(level.quantity, 25);

        let level = svc
            .adjust_stock(&product_id, StockAdjustment::Delta(-5), "breakage", "tester")
            .await
            .unwrap();
        assert_eq!(level.quantity, 20);
    }

    #[tokio::test]
    async fn test_negative_result_rejected() {
        let db = test_db().await;
        let product_id = seed_product(&db, 10).await;
        let svc = InventoryService::new(db.clone());

        let err = svc
            .adjust_stock(&product_id, StockAdjustment::Delta(-11), "typo", "tester")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpsError::Core(CoreError::InsufficientStock { available: 10, .. })
        ));

        let err = svc
            .adjust_stock(&product_id, StockAdjustment::Set(-1), "typo", "tester")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OpsError::Core(CoreError::InsufficientStock { .. })
        ));

        let level = db.products().stock_level(&product_id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = test_db().await;
        let svc = InventoryService::new(db.clone());

        let err = svc
            .adjust_stock("missing", StockAdjustment::Set(5), "x", "tester")
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Core(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let low = seed_product(&db, 2).await; // min_stock 3
        let ok = seed_product(&db, 50).await;
        let svc = InventoryService::new(db.clone());

        let items = svc.low_stock().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, low);
        assert_ne!(items[0].product_id, ok);
    }
}
