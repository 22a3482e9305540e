//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP behavior:
///
/// - **Database errors**: any sqlx::Error from storage operations, 500
/// - **Unauthorized**: missing/invalid session, redirect to the login page
/// - **NotFound**: id does not resolve to a live record owned by the
///   caller's tenant, 404
/// - **Validation**: malformed input on create/edit (e.g. a bad URL), 400
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session cookie is missing, unknown, or expired.
    ///
    /// Surfaced as an HTTP redirect to `/login`, never as 401/403 —
    /// this is a browser-facing admin surface.
    #[error("Authentication required")]
    Unauthorized,

    /// Record does not exist, is soft-deleted, or belongs to another tenant.
    ///
    /// All three cases are indistinguishable to the caller, which prevents
    /// cross-tenant existence probing.
    #[error("Record not found")]
    NotFound,

    /// Request data failed validation.
    ///
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    Validation(String),
}

/// Convert AppError into an HTTP response.
///
/// Error responses (other than the login redirect) use the JSON envelope:
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            // Unauthenticated access redirects rather than erroring.
            AppError::Unauthorized => return Redirect::to("/login").into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
