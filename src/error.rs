//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid or missing API keys
/// - **Resource Errors**: Requested customer, loan or payment not found
/// - **State Errors**: Loan status transitions that are not allowed
/// - **Validation Errors**: A request field (or path parameter) is invalid
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, malformed, or not registered.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// No row matches the requested external id.
    ///
    /// Returns HTTP 404 Not Found. The string names the resource kind.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A single field failed validation.
    ///
    /// Returns HTTP 400 Bad Request with the offending field name.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The resource is not in a state that allows the operation.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("{0}")]
    Conflict(String),

    /// Request body could not be decoded.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Body content type is not JSON, form-urlencoded or multipart.
    #[error("Unsupported media type")]
    UnsupportedMediaType,
}

impl AppError {
    /// Shorthand for a field validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Map a unique-constraint violation to a validation error on `field`.
    ///
    /// Any other database error passes through unchanged.
    pub fn on_unique_violation(err: sqlx::Error, field: &'static str, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return AppError::validation(field, message);
            }
        }
        AppError::Database(err)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::NotFound(_) => "not_found",
            AppError::Validation { .. } => "validation_error",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Conflict(_) => "conflict",
            AppError::UnsupportedMediaType => "unsupported_media_type",
            AppError::Database(_) => "internal_error",
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "Amount must be greater than zero.",
///     "field": "amount"
///   }
/// }
/// ```
///
/// `field` is only present for validation errors. Database errors are
/// logged and replaced by a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let body = match self {
            AppError::Validation { field, message } => json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            }),
            AppError::InvalidRequest(ref msg) => json!({
                "error": {
                    "code": code,
                    "message": msg
                }
            }),
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error");
                json!({
                    "error": {
                        "code": code,
                        "message": "An internal error occurred"
                    }
                })
            }
            other => json!({
                "error": {
                    "code": code,
                    "message": other.to_string()
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidApiKey.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("Loan").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::validation("amount", "bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("nope".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::InvalidApiKey.error_code(), "invalid_api_key");
        assert_eq!(
            AppError::validation("score", "bad").error_code(),
            "validation_error"
        );
        assert_eq!(AppError::NotFound("Customer").to_string(), "Customer not found");
    }

    #[test]
    fn test_non_unique_database_error_passes_through() {
        let err = AppError::on_unique_violation(sqlx::Error::RowNotFound, "external_id", "dup");
        assert!(matches!(err, AppError::Database(_)));
    }
}
