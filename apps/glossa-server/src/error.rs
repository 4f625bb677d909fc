//! Error types for the Glossa server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::notes::NoteError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// The upload route carries its own error enum to keep the original
/// `{"error": ...}` response shape; everything else funnels through here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Note error: {0}")]
    Note(#[from] NoteError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Session(e) => match e {
                SessionError::EmptyAnnotation => {
                    (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
                }
                SessionError::NoDocument => {
                    (StatusCode::CONFLICT, "no_document", e.to_string())
                }
            },
            AppError::Note(e) => {
                tracing::error!("Note sink error: {}", e);
                (StatusCode::BAD_GATEWAY, "save_error", e.to_string())
            }
            AppError::Storage(e) => match e {
                StorageError::NotFound(name) => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("File not found: {}", name),
                ),
                StorageError::InvalidFilename(name) => (
                    StatusCode::BAD_REQUEST,
                    "bad_request",
                    format!("Invalid filename: {}", name),
                ),
                StorageError::Io(e) => {
                    tracing::error!("Storage IO error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "storage_error",
                        "Storage error".to_string(),
                    )
                }
            },
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
