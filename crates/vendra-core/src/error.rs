//! # Error Types
//!
//! Domain-specific error types for vendra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendra-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendra-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── OpsError         - Service layer (Core + Db combined)             │
//! │                                                                         │
//! │  Server errors (in app)                                                │
//! │  └── ApiError         - What clients see (uniform envelope)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, remaining balances, stock)
//!    so callers can correct and resubmit
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
///
/// Every variant raised inside a database transaction causes a full
/// rollback; no partially-applied state is ever observable.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id doesn't exist (or has no stock row).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order id doesn't exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Customer id doesn't exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A stock decrement would take the quantity below zero.
    ///
    /// Carries the current quantity so the caller can correct the request.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Payment would push the completed-payment sum past the order total.
    ///
    /// Carries the remaining payable amount in cents (zero for a fully
    /// paid order).
    #[error("Payment of {amount_cents} exceeds remaining balance of {remaining_cents} on order {order_id}")]
    PaymentExceedsBalance {
        order_id: String,
        amount_cents: i64,
        remaining_cents: i64,
    },

    /// Order submitted with no item lines.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Order submitted without a customer id and without name+phone to
    /// find-or-create one.
    #[error("Order requires a customer id or a customer name and phone")]
    MissingCustomerInfo,

    /// A direct status update tried to reach a status reserved for another
    /// flow (RETURNED is only reachable via return creation).
    #[error("Order status {status} cannot be set directly; use the return flow")]
    ForbiddenStatusTransition { status: String },

    /// A second return against an order that is already RETURNED; allowing
    /// it would apply the compensating stock adjustment twice.
    #[error("Order {0} has already been returned")]
    OrderAlreadyReturned(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any transaction opens - a validation failure never
/// touches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
