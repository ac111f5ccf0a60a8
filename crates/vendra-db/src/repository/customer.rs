//! # Customer Repository
//!
//! Database operations for customers.
//!
//! The phone column carries a UNIQUE constraint: the order-submission
//! find-or-create path keys on it, and the constraint closes the race
//! between two concurrent orders both missing the same customer.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use vendra_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Looks a customer up by phone (the dedup key).
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            WHERE phone = ?1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - phone already exists; callers
    ///   in the find-or-create path fall back to [`Self::find_by_phone`]
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, phone = %customer.phone, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Finds a customer by phone, creating one if none exists.
    ///
    /// ## Race Handling
    /// ```text
    /// lookup by phone ── found ──► reuse
    ///        │
    ///      miss
    ///        ▼
    /// insert(name, phone) ── ok ──► new customer
    ///        │
    ///   UNIQUE violation  (a concurrent order inserted first)
    ///        ▼
    /// lookup by phone again ──► reuse the winner's row
    /// ```
    ///
    /// This runs as its own small pre-step, deliberately OUTSIDE the order
    /// transaction, so order-creation atomicity is not entangled with
    /// customer dedup.
    pub async fn find_or_create(&self, name: &str, phone: &str) -> DbResult<Customer> {
        if let Some(existing) = self.find_by_phone(phone).await? {
            return Ok(existing);
        }

        let customer = Customer {
            id: generate_id(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            address: None,
            created_at: Utc::now(),
        };

        match self.insert(&customer).await {
            Ok(()) => Ok(customer),
            Err(e) if e.is_unique_violation() => {
                // Lost the race; the row now exists.
                self.find_by_phone(phone)
                    .await?
                    .ok_or_else(|| DbError::not_found("Customer", phone))
            }
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
