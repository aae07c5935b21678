use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{BlobStage, StagingError};
use crate::domain::{AudioPayload, StagedAudioRef};
use crate::infrastructure::observability::sanitize_provider_body;

pub const DEFAULT_FILE_IO_ENDPOINT: &str = "https://file.io";

/// Uploads to file.io. Links are deleted after their first download, which is
/// exactly one fetch by the inference provider.
pub struct FileIoBlobStage {
    client: reqwest::Client,
    endpoint: String,
    expiry: Option<String>,
}

impl FileIoBlobStage {
    pub fn new(client: reqwest::Client, endpoint: Option<String>, expiry: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_FILE_IO_ENDPOINT.to_string()),
            expiry: expiry.filter(|e| !e.trim().is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct FileIoResponse {
    success: bool,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    expires: Option<String>,
}

#[async_trait]
impl BlobStage for FileIoBlobStage {
    async fn stage(&self, payload: AudioPayload) -> Result<StagedAudioRef, StagingError> {
        let file_name = payload.file_name_or_default();
        let file_part = multipart::Part::stream_with_length(
            payload.bytes.clone(),
            payload.len() as u64,
        )
            .file_name(file_name)
            .mime_str(&payload.content_type)
            .map_err(|e| StagingError::Request(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new().part("file", file_part);
        if let Some(expiry) = &self.expiry {
            form = form.text("expires", expiry.clone());
        }

        tracing::debug!(bytes = payload.len(), "Uploading audio to file.io");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(StagingError::Rejected {
                status: status.as_u16(),
                body: sanitize_provider_body(&body),
            });
        }

        let result: FileIoResponse = response.json().await?;
        let link = match result.link {
            Some(link) if result.success && !link.is_empty() => link,
            _ => {
                return Err(StagingError::InvalidResponse(
                    "upload not acknowledged with a link".to_string(),
                ));
            }
        };

        let mut staged = StagedAudioRef::new(link).one_time_use();
        if let Some(expires_at) = result
            .expires
            .as_deref()
            .and_then(|e| DateTime::parse_from_rfc3339(e).ok())
        {
            staged = staged.expiring_at(expires_at.with_timezone(&Utc));
        }
        Ok(staged)
    }

    fn name(&self) -> &'static str {
        "file_io"
    }
}
