use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// `phone` or `amount` absent or falsy
    #[error("phone and amount are required")]
    MissingFields,

    /// `amount` present but not a finite positive number
    #[error("amount must be a positive number")]
    InvalidAmount,

    /// Gateway answered but reported a business failure
    #[error("gateway rejected the payment: {0}")]
    Rejected(Value),

    /// Gateway claimed success without a usable redirect URL
    #[error("gateway response has an unexpected shape: {0}")]
    MalformedResponse(Value),

    /// Gateway did not answer within the configured timeout
    #[error("gateway request timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PaymentError::Timeout
        } else {
            PaymentError::Internal(format!("gateway request failed: {}", e))
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(e: serde_json::Error) -> Self {
        PaymentError::Internal(format!("serialization failed: {}", e))
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            PaymentError::MissingFields | PaymentError::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string() }),
            ),
            PaymentError::Rejected(details) => {
                error!("PhonePe pay error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "ok": false,
                        "error": "Failed to create PhonePe payment",
                        "details": details
                    }),
                )
            }
            PaymentError::MalformedResponse(details) => {
                error!("PhonePe pay response missing redirect URL: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "ok": false,
                        "error": "Failed to create PhonePe payment",
                        "details": details
                    }),
                )
            }
            PaymentError::Timeout => {
                error!("PhonePe pay request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    json!({ "ok": false, "error": "Payment gateway timed out" }),
                )
            }
            PaymentError::Internal(msg) => {
                error!("Server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "ok": false, "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
