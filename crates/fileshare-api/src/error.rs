use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fileshare_metadata::StoreError;
use serde_json::json;

use crate::blob_store::BlobStoreError;

/// Application error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// Every authentication failure renders identically
    Unauthorized,
    /// Login failure; unknown email and wrong password render identically
    InvalidCredentials,
    Conflict(String),
    PayloadTooLarge(String),
    Internal(String),
    Storage(StoreError),
    Blob(BlobStoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid or expired token".into()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password".into())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            AppError::Blob(e) => {
                tracing::error!(error = %e, "Blob store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Unable to upload file".into())
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken(_) => AppError::Conflict("Email already registered".into()),
            e => AppError::Storage(e),
        }
    }
}

impl From<BlobStoreError> for AppError {
    fn from(e: BlobStoreError) -> Self {
        match e {
            BlobStoreError::InvalidName(name) => {
                AppError::BadRequest(format!("Invalid file name: {name:?}"))
            }
            e => AppError::Blob(e),
        }
    }
}
