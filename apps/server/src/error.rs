//! # API Error Handling
//!
//! Translates service-layer errors into HTTP responses with stable machine
//! codes, using one error envelope for every failure:
//!
//! ```json
//! { "success": false, "error": { "code": "INSUFFICIENT_STOCK", "message": "..." } }
//! ```
//!
//! ## Status Mapping
//! ```text
//! 400  validation failures, malformed input
//! 404  unknown ids (product, order, customer)
//! 422  business rule violations (stock, overpayment, forbidden transitions)
//! 500  database/infrastructure failures (detail logged, not leaked)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use vendra_core::CoreError;
use vendra_db::{DbError, OpsError};

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Business or validation error with a stable code.
    #[error("{message}")]
    Domain {
        status: StatusCode,
        code: ErrorCode,
        message: String,
    },

    /// Infrastructure failure; detail is logged, clients see a generic body.
    #[error("Internal error")]
    Internal(#[source] DbError),
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    NotFound,
    InsufficientStock,
    PaymentExceedsBalance,
    EmptyOrder,
    MissingCustomerInfo,
    ForbiddenStatusTransition,
    AlreadyReturned,
    DuplicatePhone,
    Internal,
}

impl ApiError {
    fn domain(status: StatusCode, code: ErrorCode, message: String) -> Self {
        ApiError::Domain {
            status,
            code,
            message,
        }
    }

    /// 400 with VALIDATION_FAILED, for handler-level input checks.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::domain(
            StatusCode::BAD_REQUEST,
            ErrorCode::ValidationFailed,
            message.into(),
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::CustomerNotFound(_) => {
                Self::domain(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
            }
            CoreError::InsufficientStock { .. } => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InsufficientStock,
                message,
            ),
            CoreError::PaymentExceedsBalance { .. } => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::PaymentExceedsBalance,
                message,
            ),
            CoreError::EmptyOrder => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::EmptyOrder,
                message,
            ),
            CoreError::MissingCustomerInfo => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::MissingCustomerInfo,
                message,
            ),
            CoreError::ForbiddenStatusTransition { .. } => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ForbiddenStatusTransition,
                message,
            ),
            CoreError::OrderAlreadyReturned(_) => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::AlreadyReturned,
                message,
            ),
            CoreError::Validation(_) => Self::domain(
                StatusCode::BAD_REQUEST,
                ErrorCode::ValidationFailed,
                message,
            ),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => Self::domain(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                err.to_string(),
            ),
            DbError::UniqueViolation { .. } => Self::domain(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::DuplicatePhone,
                err.to_string(),
            ),
            other => ApiError::Internal(other),
        }
    }
}

impl From<OpsError> for ApiError {
    fn from(err: OpsError) -> Self {
        match err {
            OpsError::Core(core) => core.into(),
            OpsError::Db(db) => db.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Domain {
                status,
                code,
                message,
            } => (status, code, message),
            ApiError::Internal(db) => {
                error!(error = %db, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Internal,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}
