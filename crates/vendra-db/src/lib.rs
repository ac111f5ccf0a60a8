//! # vendra-db: Database Layer for Vendra
//!
//! This crate provides persistence for the Vendra operations platform.
//! It uses SQLite for storage with sqlx for async operations, and hosts
//! the transaction services that implement the business flows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendra Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vendra-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (service/)    │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ OrderService  │───►│ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ PaymentService│    │ OrderRepo     │    │              │  │   │
//! │  │   │ ReturnService │    │ CustomerRepo  │    │              │  │   │
//! │  │   │ InventorySvc  │    │ AuditRepo ... │    │              │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │      Database      │                              │   │
//! │  │           └────────(pool.rs)───┘                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        WAL mode • foreign keys ON • CHECK(quantity >= 0)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Plain CRUD/read access per aggregate
//! - [`service`] - Multi-step transactional flows (orders, payments,
//!   returns, stock adjustments)
//!
//! ## Repositories vs Services
//! Repositories never mutate stock or order status on their own; anything
//! that must be atomic across tables goes through a service, which owns
//! the transaction and writes the audit entry after commit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendra_db::{Database, DbConfig};
//! use vendra_db::service::order::{NewOrder, OrderService};
//!
//! let db = Database::new(DbConfig::new("vendra.db")).await?;
//!
//! let orders = OrderService::new(db.clone());
//! let created = orders.create_order(new_order, "user-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{OpsError, OpsResult};

// Service re-exports for convenience
pub use service::inventory::InventoryService;
pub use service::order::OrderService;
pub use service::payment::PaymentService;
pub use service::returns::ReturnService;
