use async_trait::async_trait;

use crate::domain::{InferenceJob, JobStatus, ModelVersion, StagedAudioRef};

/// Remote speech-to-text provider that runs jobs asynchronously.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Queues a job for `input`. The reference is consumed: a staged URL is
    /// handed to the provider exactly once.
    async fn submit(
        &self,
        input: StagedAudioRef,
        model_version: &ModelVersion,
    ) -> Result<InferenceJob, SubmissionError>;

    /// Single status query. An `Err` means the job state is unknown, which is
    /// not the same as the provider reporting `JobStatus::Failed`.
    async fn poll(&self, job: &InferenceJob) -> Result<JobStatus, PollError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("provider rejected submission with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("submission request failed: {0}")]
    Request(String),
    #[error("submission request timed out: {0}")]
    Timeout(String),
    #[error("provider returned an invalid submission response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SubmissionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SubmissionError::Timeout(e.to_string())
        } else if e.is_decode() {
            SubmissionError::InvalidResponse(e.to_string())
        } else {
            SubmissionError::Request(e.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("status query rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("status query failed: {0}")]
    Request(String),
    #[error("status query timed out: {0}")]
    Timeout(String),
    #[error("provider returned an invalid status response: {0}")]
    InvalidResponse(String),
}

impl PollError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout(_))
    }
}

impl From<reqwest::Error> for PollError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PollError::Timeout(e.to_string())
        } else if e.is_decode() {
            PollError::InvalidResponse(e.to_string())
        } else {
            PollError::Request(e.to_string())
        }
    }
}
