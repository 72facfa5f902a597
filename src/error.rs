//! Error types for the site inventory server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{models::site::InvalidSiteId, reconcile::draft::DraftError};

/// Stable numeric error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    DbFailure = 3,
    NoSuchRecord = 5,
    BadValue = 18,
    NoSuchData = 20,
    DraftState = 23,
    Conflict = 24,
    CommitFailed = 25,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store refused or failed a save; the message is shown to the operator as is
    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl From<InvalidSiteId> for AppError {
    fn from(e: InvalidSiteId) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl AppError {
    /// Wrap a store failure raised while committing a save
    pub fn commit(source: AppError) -> Self {
        match source {
            AppError::Commit(msg) => AppError::Commit(msg),
            AppError::Database(e) => AppError::Commit(e.to_string()),
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::Conflict(msg) => {
                AppError::Commit(msg)
            }
            other => AppError::Commit(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Conflict, msg.clone())
            }
            AppError::Commit(msg) => {
                tracing::error!("Commit failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::CommitFailed,
                    msg.clone(),
                )
            }
            AppError::Draft(e) => match e {
                DraftError::UnknownRecord(_) => {
                    (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, e.to_string())
                }
                _ => (StatusCode::CONFLICT, ErrorCode::DraftState, e.to_string()),
            },
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

    #[tokio::test]
    async fn test_commit_failure_keeps_store_message() {
        let err = AppError::commit(AppError::Database(sqlx::Error::Protocol(
            "store unavailable".into(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "CommitFailed");
        assert_eq!(body["code"], 25);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("store unavailable"));
    }

    #[test]
    fn test_commit_of_missing_record_is_not_reworded() {
        let err = AppError::commit(AppError::NotFound("Inventory record 1 not found".into()));
        assert_eq!(err.to_string(), "Commit failed: Inventory record 1 not found");
    }
}
