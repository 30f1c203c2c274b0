//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    #[error("Account {account_id} currency mismatch: {found} vs {expected}")]
    CurrencyMismatch {
        account_id: i64,
        expected: String,
        found: String,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Transfer not found: {0}")]
    TransferNotFound(i64),

    // Store errors
    #[error(transparent)]
    Store(#[from] StoreError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::SameAccountTransfer => {
                (StatusCode::BAD_REQUEST, "same_account_transfer", None)
            }
            AppError::CurrencyMismatch { account_id, .. } => (
                StatusCode::BAD_REQUEST,
                "currency_mismatch",
                Some(account_id.to_string()),
            ),

            // 404 Not Found
            AppError::AccountNotFound(id) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
            }
            AppError::EntryNotFound(id) => {
                (StatusCode::NOT_FOUND, "entry_not_found", Some(id.to_string()))
            }
            AppError::TransferNotFound(id) => {
                (StatusCode::NOT_FOUND, "transfer_not_found", Some(id.to_string()))
            }

            AppError::Store(store_err) => match store_err.original() {
                StoreError::DeadlineExceeded if !store_err.is_rollback_failure() => {
                    (StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded", None)
                }
                StoreError::Cancelled if !store_err.is_rollback_failure() => {
                    (StatusCode::SERVICE_UNAVAILABLE, "cancelled", None)
                }
                StoreError::Database(db_err) if !store_err.is_rollback_failure() => {
                    database_status(db_err)
                }
                _ => {
                    tracing::error!("Store error: {:?}", store_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
                }
            },

            AppError::Database(e) => database_status(e),
        }
    }
}

/// Row accessor errors: missing rows and constraint violations are the
/// caller's fault, the rest is ours
fn database_status(e: &sqlx::Error) -> (StatusCode, &'static str, Option<String>) {
    match e {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "not_found", None),
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => (
            StatusCode::CONFLICT,
            "foreign_key_violation",
            db_err.constraint().map(str::to_string),
        ),
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => (
            StatusCode::BAD_REQUEST,
            "check_violation",
            db_err.constraint().map(str::to_string),
        ),
        _ => {
            tracing::error!("Database error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
