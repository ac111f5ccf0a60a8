//! # Domain Types
//!
//! Core domain types used throughout Vendra.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sale_price ¢   │   │  order_type     │   │  order_id (FK)  │       │
//! │  │  status         │   │  total_cents    │   │  amount_cents   │       │
//! │  └────────┬────────┘   │  status         │   │  status         │       │
//! │           │ 1:1        │  payment_status │   └─────────────────┘       │
//! │  ┌────────▼────────┐   └────────┬────────┘                             │
//! │  │   StockLevel    │            │ 1:N                                  │
//! │  │  quantity >= 0  │   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  └─────────────────┘   │   OrderItem     │   │  ReturnRecord   │       │
//! │                        │  (immutable)    │   │  (flips order)  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle Ownership
//! An order and its items are created together in one transaction and are
//! immutable afterwards; `status` and `payment_status` are the only mutable
//! order fields. Corrections happen via returns, never edits. Payments are
//! append-only. Stock is written only by the transaction services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Order Type
// =============================================================================

/// The commercial direction of an order.
///
/// The variant decides the sign of every stock movement the order causes;
/// see [`crate::stock::StockDirection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Goods leave the warehouse to a customer.
    Sale,
    /// Goods arrive from a supplier.
    Purchase,
    /// A customer sends goods back (created as its own order).
    SaleReturn,
    /// Goods are sent back to a supplier (created as its own order).
    PurchaseReturn,
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
///
/// ```text
/// PENDING ──► CONFIRMED ──► PROCESSING ──► SHIPPED ──► DELIVERED
///    │
///    ├──────► CANCELLED           (direct update, no stock effect)
///    └──────► RETURNED            (ONLY via return creation - it carries
///                                  the compensating stock adjustment)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Whether a direct status update may set this value.
    ///
    /// `Returned` is excluded: only return creation may reach it, because
    /// only that path reverses the order's stock movements.
    pub fn directly_settable(&self) -> bool {
        !matches!(self, OrderStatus::Returned)
    }
}

// =============================================================================
// Payment Status (derived)
// =============================================================================

/// Derived payment state of an order, persisted on the order row.
///
/// Stored rather than computed on read because reporting and due-lists
/// query the column directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Derives the payment status from the sum of COMPLETED payments and
    /// the order total.
    ///
    /// Integer cents make the comparison exact:
    /// - `Unpaid`  iff nothing has been paid
    /// - `Paid`    iff paid >= total
    /// - `Partial` otherwise
    ///
    /// Must be recomputed and persisted in the same transaction as every
    /// payment insertion.
    pub fn derive(total_paid: Money, total: Money) -> Self {
        if total_paid.is_zero() {
            PaymentStatus::Unpaid
        } else if total_paid >= total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}

// =============================================================================
// Payment Method / State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileWallet,
    BankTransfer,
}

/// State of an individual payment row.
///
/// Only `Completed` payments count towards the order's paid sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    Completed,
    Pending,
    Failed,
}

// =============================================================================
// Return Type
// =============================================================================

/// Kind of a return record (the compensating action against an order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    SaleReturn,
    PurchaseReturn,
    /// Generic return; stock sign falls back to the parent order's type.
    Return,
}

// =============================================================================
// Product Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

// =============================================================================
// Product & Stock
// =============================================================================

/// A product in the catalogue.
///
/// The stock quantity deliberately lives on a separate [`StockLevel`] record
/// so it can be mutated independently of product metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    /// Buying price in cents.
    pub purchase_price_cents: i64,
    /// Selling price in cents.
    pub sale_price_cents: i64,
    /// Reorder threshold; stock at or below this is "low".
    pub min_stock: i64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }
}

/// Per-product stock quantity.
///
/// Invariant: `quantity >= 0`, enforced both by the services (with a
/// contextual error) and a database CHECK constraint as backstop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub product_id: String,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer / Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique; the find-or-create path on order submission keys on it.
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order & Items
// =============================================================================

/// An order header.
///
/// `total_cents` is computed at creation from the item lines and immutable
/// thereafter. `status` and `payment_status` are the only fields mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub order_type: OrderType,
    pub order_date: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub supplier_id: Option<String>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub courier_id: Option<String>,
    pub tracking_id: Option<String>,
    /// Actor who last confirmed/changed the status directly.
    pub confirmed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line on an order. Created atomically with the order header and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment against an order. Many payments may reference one order;
/// rows are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    /// Payment channel (gateway/provider), when relevant.
    pub channel: Option<String>,
    /// External transaction reference.
    pub txn_ref: Option<String>,
    pub status: PaymentState,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Return Record
// =============================================================================

/// A return/refund record. Creating one is the single action that flips
/// the parent order to `Returned` and reverses its stock movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReturnRecord {
    pub id: String,
    pub order_id: String,
    pub return_type: ReturnType,
    pub amount_cents: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    pub category: String,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub spent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// A human-readable audit event.
///
/// Written best-effort after business transactions commit; a failed audit
/// write never fails the operation that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLog {
    pub id: String,
    pub actor_id: String,
    pub category: String,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
