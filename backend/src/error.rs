//! Error handling for the FarmGuard AI backend
//!
//! Every error renders as a flat `{"error": message}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use farmguard_vision::VisionError;
use serde::Serialize;
use thiserror::Error;

/// Message returned when a detection request carries no `file` field
pub const NO_IMAGE_MESSAGE: &str = "No image uploaded";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("No image uploaded")]
    MissingImage,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    // Model errors
    #[error("Model artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<VisionError> for AppError {
    fn from(e: VisionError) -> Self {
        match e {
            VisionError::ArtifactMissing(_)
            | VisionError::Manifest(_)
            | VisionError::Record(_)
            | VisionError::InvalidConfig(_) => AppError::ArtifactUnavailable(e.to_string()),
            VisionError::Image(msg) => AppError::InvalidImage(msg),
            VisionError::Tensor(msg) => AppError::Inference(msg),
            VisionError::Io(io) => AppError::StorageError(io.to_string()),
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl AppError {
    /// HTTP status for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingImage | AppError::InvalidUpload(_) | AppError::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ArtifactUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Inference(_)
            | AppError::StorageError(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_message() {
        assert_eq!(AppError::MissingImage.to_string(), NO_IMAGE_MESSAGE);
        assert_eq!(AppError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_vision_error_mapping() {
        let err: AppError = VisionError::Image("bad header".into()).into();
        assert!(matches!(err, AppError::InvalidImage(_)));

        let err: AppError = VisionError::Tensor("shape".into()).into();
        assert!(matches!(err, AppError::Inference(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: AppError = VisionError::Manifest("eof".into()).into();
        assert!(matches!(err, AppError::ArtifactUnavailable(_)));
    }
}
