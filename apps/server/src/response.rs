//! The uniform JSON envelope every endpoint answers with.
//!
//! ```json
//! { "success": true,  "message": "Order created", "data": { ... }, "error": null }
//! { "success": false, "message": null, "data": null,
//!   "error": { "code": "INSUFFICIENT_STOCK", "message": "..." } }
//! ```

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Success envelope with an optional human-readable message.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with data.
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            data,
        }
    }

    /// 200 OK with data and a message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let body = ApiResponse::ok_with_message(json!({"id": "o-1"}), "Order created");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["message"], json!("Order created"));
        assert_eq!(value["data"]["id"], json!("o-1"));
    }

    #[test]
    fn test_message_omitted_when_absent() {
        let body = ApiResponse::ok(json!([]));
        let value = serde_json::to_value(&body).unwrap();

        assert!(value.get("message").is_none());
        assert_eq!(value["data"], json!([]));
    }
}
