use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::TranscriptionError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub category: String,
}

impl ErrorResponse {
    pub fn new(category: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            category: category.to_string(),
        }
    }
}

pub fn status_for(error: &TranscriptionError) -> StatusCode {
    match error {
        TranscriptionError::Validation(_) => StatusCode::BAD_REQUEST,
        TranscriptionError::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        TranscriptionError::Staging(_) | TranscriptionError::Submission(_) => {
            StatusCode::BAD_GATEWAY
        }
        TranscriptionError::Poll { source, .. } if source.is_timeout() => {
            StatusCode::GATEWAY_TIMEOUT
        }
        TranscriptionError::Poll { .. } => StatusCode::BAD_GATEWAY,
        TranscriptionError::ProviderReportedFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        TranscriptionError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        TranscriptionError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Caller-facing text. Provider bodies and internal details stay in the logs.
pub fn message_for(error: &TranscriptionError) -> String {
    match error {
        TranscriptionError::Validation(detail) => detail.clone(),
        TranscriptionError::UnsupportedContentType(content_type) => {
            format!("Unsupported content type: {}", content_type)
        }
        TranscriptionError::Staging(_) => "Failed to stage audio for transcription".to_string(),
        TranscriptionError::Submission(_) => {
            "Speech recognition provider rejected the request".to_string()
        }
        TranscriptionError::Poll { .. } => {
            "Lost contact with the speech recognition provider".to_string()
        }
        TranscriptionError::ProviderReportedFailure { .. } => "Transcription failed".to_string(),
        TranscriptionError::Timeout { .. } => "Transcription timed out".to_string(),
        TranscriptionError::Cancelled => "Transcription cancelled".to_string(),
    }
}

impl IntoResponse for TranscriptionError {
    fn into_response(self) -> Response {
        (
            status_for(&self),
            Json(ErrorResponse::new(self.category(), message_for(&self))),
        )
            .into_response()
    }
}

pub fn validation_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("validation_error", message)),
    )
        .into_response()
}
