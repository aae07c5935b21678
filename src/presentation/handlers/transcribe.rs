use axum::Json;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::TranscriptionInput;
use crate::domain::AudioPayload;
use crate::presentation::state::AppState;

use super::error_response::{ErrorResponse, validation_error};

const FILE_FIELDS: [&str; 2] = ["file", "audio"];
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Deserialize)]
pub struct AudioUrlRequest {
    pub audio_url: Option<String>,
}

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Either a JSON `{"audio_url": ...}` body or a multipart upload with a
/// `file` (or `audio`) part, told apart by `Content-Type`.
pub struct TranscribeRequest(pub TranscriptionInput);

impl<S> FromRequest<S> for TranscribeRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| validation_error(format!("Failed to read multipart: {}", e)))?;
            return read_upload(multipart).await.map(Self);
        }

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<AudioUrlRequest>::from_request(req, state)
                .await
                .map_err(|e| validation_error(format!("Invalid JSON body: {}", e)))?;
            return match body.audio_url {
                Some(url) if !url.trim().is_empty() => Ok(Self(TranscriptionInput::AudioUrl(url))),
                _ => {
                    tracing::warn!("Transcription request without audio_url");
                    Err(validation_error("Missing audio_url"))
                }
            };
        }

        if content_type.is_empty() {
            return Err(validation_error(
                "Missing audio: send multipart `file` or JSON `audio_url`",
            ));
        }

        Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(ErrorResponse::new(
                "unsupported_media_type",
                format!("Unsupported request content type: {}", content_type),
            )),
        )
            .into_response())
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<TranscriptionInput, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                tracing::warn!("Transcription upload with no file part");
                return Err(validation_error("No audio file uploaded"));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return Err(validation_error(format!("Failed to read multipart: {}", e)));
            }
        };

        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read audio bytes");
            validation_error(format!("Failed to read file: {}", e))
        })?;

        tracing::debug!(bytes = data.len(), content_type = %content_type, "Audio upload received");

        let mut payload = AudioPayload::new(data, content_type);
        if let Some(name) = file_name {
            payload = payload.with_file_name(name);
        }
        return Ok(TranscriptionInput::Upload(payload));
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    TranscribeRequest(request): TranscribeRequest,
) -> Response {
    // Dropping the handler future (client went away) or shutting down cancels polling.
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    match state.transcription_service.transcribe(request, cancel).await {
        Ok(transcript) => (
            StatusCode::OK,
            Json(TranscribeResponse {
                text: transcript.into_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(category = e.category(), error = %e, "Transcription request failed");
            e.into_response()
        }
    }
}
