//! Error handling for the Harvest ERP backend
//!
//! Maps the application error taxonomy onto HTTP responses with a
//! structured JSON body. Internal detail is logged, never leaked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed")]
    ValidationFailed(#[from] validator::ValidationErrors),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // Upstream failures
    #[error("Report rendering failed: {0}")]
    RenderError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Password hashing error")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Token signing error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Collect field-level messages from `validator` output
fn validation_details(errors: &validator::ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid email or password"),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid or missing token"),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::ValidationFailed(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: "One or more fields are invalid".to_string(),
                    field: None,
                    details: Some(validation_details(errors)),
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                )
                .with_field(field.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            // Deleting a non-pending purchase order and similar lifecycle
            // violations are client errors.
            AppError::InvalidStateTransition(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INVALID_STATE_TRANSITION", msg.clone()),
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("INSUFFICIENT_STOCK", msg.clone()),
            ),
            AppError::RenderError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("RENDER_ERROR", "Report rendering failed"),
            ),
            AppError::StorageError(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new("STORAGE_ERROR", "Storage is temporarily unavailable"),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Bcrypt(_) | AppError::Jwt(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_pending_delete_maps_to_bad_request() {
        let response = AppError::InvalidStateTransition(
            "only pending purchase orders can be deleted".to_string(),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_entry_maps_to_conflict() {
        let response = AppError::DuplicateEntry("code".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Supplier".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
