//! # Repository Module
//!
//! Database repository implementations for Vendra.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repositories hold the plain, single-statement CRUD and read queries.  │
//! │                                                                         │
//! │  HTTP handler / service                                                │
//! │       │   db.orders().get_by_id(id)                                    │
//! │       ▼                                                                 │
//! │  OrderRepository ──► SQL ──► SQLite                                    │
//! │                                                                         │
//! │  The multi-statement transactional flows (order creation, payment     │
//! │  application, return processing, stock adjustment) do NOT live here - │
//! │  they live in `service/`, each holding one transaction across all     │
//! │  its statements.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD and stock reads
//! - [`customer::CustomerRepository`] - Customer CRUD, lookup by phone
//! - [`supplier::SupplierRepository`] - Supplier CRUD
//! - [`order::OrderRepository`] - Order/item/payment/return reads
//! - [`expense::ExpenseRepository`] - Expense recording
//! - [`audit::AuditRepository`] - Audit trail writes and reads

pub mod audit;
pub mod customer;
pub mod expense;
pub mod order;
pub mod product;
pub mod supplier;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
