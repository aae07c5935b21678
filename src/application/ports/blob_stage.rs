use async_trait::async_trait;

use crate::domain::{AudioPayload, StageReceipt, StagedAudioRef};

/// Makes audio bytes fetchable at a URL the inference provider can reach.
#[async_trait]
pub trait BlobStage: Send + Sync {
    async fn stage(&self, payload: AudioPayload) -> Result<StagedAudioRef, StagingError>;

    /// Best-effort cleanup once the job that consumed the reference is terminal.
    async fn release(&self, _receipt: &StageReceipt) -> Result<(), StagingError> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("blob store rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("blob store request failed: {0}")]
    Request(String),
    #[error("blob store request timed out: {0}")]
    Timeout(String),
    #[error("blob store returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("blob storage error: {0}")]
    Storage(String),
    #[error("blob stage misconfigured: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for StagingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StagingError::Timeout(e.to_string())
        } else if e.is_decode() {
            StagingError::InvalidResponse(e.to_string())
        } else {
            StagingError::Request(e.to_string())
        }
    }
}
