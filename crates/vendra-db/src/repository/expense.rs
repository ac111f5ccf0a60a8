//! # Expense Repository

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use vendra_core::Expense;

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records a new expense.
    pub async fn insert(
        &self,
        category: &str,
        amount_cents: i64,
        note: Option<String>,
        spent_at: DateTime<Utc>,
    ) -> DbResult<Expense> {
        let expense = Expense {
            id: generate_id(),
            category: category.to_string(),
            amount_cents,
            note,
            spent_at,
            created_at: Utc::now(),
        };

        debug!(id = %expense.id, category = %category, amount = amount_cents, "Recording expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, category, amount_cents, note, spent_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(expense.amount_cents)
        .bind(&expense.note)
        .bind(expense.spent_at)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Lists expenses, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, amount_cents, note, spent_at, created_at
            FROM expenses
            ORDER BY spent_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }
}
