//! # Product Repository
//!
//! Database operations for products and their stock rows.
//!
//! ## Stock Ownership
//! The `stock_levels` quantity is mutated ONLY by the transaction services
//! (order creation, return creation, manual adjustment). This repository
//! creates the row alongside the product and reads it; it never applies
//! deltas outside a service transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use vendra_core::{Product, ProductStatus, StockLevel};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

/// A product joined with its stock quantity, for listings.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ProductWithStock {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub min_stock: i64,
    pub status: ProductStatus,
    pub quantity: i64,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id,
                   purchase_price_cents, sale_price_cents,
                   min_stock, status, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products with their current stock, sorted by name.
    pub async fn list_with_stock(&self, limit: u32) -> DbResult<Vec<ProductWithStock>> {
        let products = sqlx::query_as::<_, ProductWithStock>(
            r#"
            SELECT p.id, p.name, p.category_id,
                   p.purchase_price_cents, p.sale_price_cents,
                   p.min_stock, p.status,
                   COALESCE(s.quantity, 0) AS quantity
            FROM products p
            LEFT JOIN stock_levels s ON s.product_id = p.id
            WHERE p.status != 'archived'
            ORDER BY p.name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product together with its (empty) stock row.
    ///
    /// Both inserts share one transaction so a product can never exist
    /// without a stock record.
    pub async fn insert(&self, product: &Product, initial_stock: i64) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category_id,
                purchase_price_cents, sale_price_cents,
                min_stock, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.min_stock)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_levels (product_id, quantity, updated_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&product.id)
        .bind(initial_stock)
        .bind(product.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Updates product metadata (name, prices, category, threshold, status).
    ///
    /// Does NOT touch the stock quantity - that goes through the inventory
    /// service so the audit trail can tell the two apart.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                purchase_price_cents = ?4,
                sale_price_cents = ?5,
                min_stock = ?6,
                status = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.min_stock)
        .bind(product.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Archives a product (soft delete - historical orders still reference it).
    pub async fn archive(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Archiving product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET status = 'archived', updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Reads the current stock level for a product.
    pub async fn stock_level(&self, product_id: &str) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT product_id, quantity, updated_at
            FROM stock_levels
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Counts non-archived products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status != 'archived'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Builds a new product with generated id and timestamps.
pub fn new_product(
    name: &str,
    category_id: Option<String>,
    purchase_price_cents: i64,
    sale_price_cents: i64,
    min_stock: i64,
) -> Product {
    let now = Utc::now();
    Product {
        id: generate_id(),
        name: name.to_string(),
        category_id,
        purchase_price_cents,
        sale_price_cents,
        min_stock,
        status: ProductStatus::Active,
        created_at: now,
        updated_at: now,
    }
}
