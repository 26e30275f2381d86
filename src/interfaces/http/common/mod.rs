//! Shared HTTP response types and extractors

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response wrapper.
///
/// All REST endpoints return data in this envelope.
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` when the request succeeded
    pub success: bool,
    /// Payload. `null` on error
    pub data: Option<T>,
    /// Error description. Absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a domain error.
///
/// Duplicate signups surface as 400, matching the public contract the
/// frontend was built against.
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error to the standard error tuple handlers return.
pub fn error_response<T>(error: DomainError) -> (StatusCode, axum::Json<ApiResponse<T>>) {
    (
        status_for(&error),
        axum::Json(ApiResponse::error(error.to_string())),
    )
}
