use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use imgvault_storage::StorageError;
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("File not found")]
    FileNotFound,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::FileNotFound,
            StorageError::InvalidToken => ApiError::InvalidToken,
            StorageError::Configuration(_) | StorageError::InvalidKey(_) => {
                ApiError::BadRequest(err.to_string())
            }
            StorageError::Backend(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::FileNotFound => (StatusCode::NOT_FOUND, "File not found".to_string()),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(detail) => {
                // Details stay in the log; clients get a fixed message
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
