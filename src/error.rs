//! Error types for the BiblioApp server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes surfaced to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    AlreadyBorrowed = 5,
    AlreadyReturned = 6,
    DuplicateLoan = 7,
    BadValue = 8,
    ReviewStoreDown = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Book is already borrowed")]
    AlreadyBorrowed,

    #[error("Loan has already been returned")]
    AlreadyReturned,

    #[error("User already holds an active loan on this book")]
    DuplicateActiveLoan,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Review store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Review store error: {0}")]
    ReviewStore(#[from] mongodb::error::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::AlreadyBorrowed => ErrorCode::AlreadyBorrowed,
            AppError::AlreadyReturned => ErrorCode::AlreadyReturned,
            AppError::DuplicateActiveLoan => ErrorCode::DuplicateLoan,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Unauthorized(_) => ErrorCode::NotAuthorized,
            AppError::StoreUnavailable(_) => ErrorCode::ReviewStoreDown,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::ReviewStore(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyBorrowed
            | AppError::AlreadyReturned
            | AppError::DuplicateActiveLoan => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::ReviewStore(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::ReviewStore(e) => {
                tracing::error!("Review store error: {:?}", e);
                "Review store error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_failures_map_to_conflict() {
        assert_eq!(AppError::AlreadyBorrowed.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyReturned.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DuplicateActiveLoan.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_entities_map_to_not_found() {
        let err = AppError::NotFound("book 42".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), ErrorCode::NoSuchData);
    }

    #[test]
    fn disabled_review_store_maps_to_service_unavailable() {
        let err = AppError::StoreUnavailable("review features are disabled".to_string());
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), ErrorCode::ReviewStoreDown);
    }

    #[test]
    fn validation_errors_convert_to_bad_value() {
        let err = AppError::Validation("rating out of range".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), ErrorCode::BadValue);
    }
}
