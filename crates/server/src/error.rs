use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use trellis_store::StoreError;

/// Request failure carrying the status it maps to. Every error leaves the
/// service as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Rejected input; nothing was applied.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Membership check failed (or no principal). The message deliberately
    /// carries no detail about what exists.
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
        }
    }

    /// Referenced resource does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Mapped status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, .. } => ApiError {
                status: StatusCode::NOT_FOUND,
                message: format!("{entity} not found"),
            },
            StoreError::Backend(_) => ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(status = %self.status, error = %self.message, "request failed");
        let body = Json(serde_json::json!({
            "error": self.message
        }));
        (self.status, body).into_response()
    }
}
