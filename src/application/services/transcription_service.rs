use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    BlobStage, InferenceGateway, PollError, StagingError, SubmissionError,
};
use crate::domain::{
    AudioPayload, InferenceJob, InferenceJobId, InvalidAudioUrl, ModelVersion, StageReceipt,
    StagedAudioRef, Transcript,
};

use super::job_poller::{JobPoller, PollerError};

/// The two inbound shapes: raw audio that must be staged first, or a URL the
/// caller already made reachable.
#[derive(Debug)]
pub enum TranscriptionInput {
    Upload(AudioPayload),
    AudioUrl(String),
}

/// Stage, submit, poll, normalize. Every step depends on the previous one and
/// the first failure ends the request.
pub struct TranscriptionService {
    blob_stage: Arc<dyn BlobStage>,
    gateway: Arc<dyn InferenceGateway>,
    poller: JobPoller,
    model_version: ModelVersion,
}

impl TranscriptionService {
    pub fn new(
        blob_stage: Arc<dyn BlobStage>,
        gateway: Arc<dyn InferenceGateway>,
        poller: JobPoller,
        model_version: ModelVersion,
    ) -> Self {
        Self {
            blob_stage,
            gateway,
            poller,
            model_version,
        }
    }

    pub fn model_version(&self) -> &ModelVersion {
        &self.model_version
    }

    #[tracing::instrument(skip(self, input, cancel))]
    pub async fn transcribe(
        &self,
        input: TranscriptionInput,
        cancel: CancellationToken,
    ) -> Result<Transcript, TranscriptionError> {
        match input {
            TranscriptionInput::Upload(payload) => self.transcribe_upload(payload, &cancel).await,
            TranscriptionInput::AudioUrl(url) => {
                let staged = StagedAudioRef::caller_provided(&url)?;
                tracing::info!(url = %staged.redacted(), "Using caller-provided audio URL");
                let job = self.submit(staged, &cancel).await?;
                self.await_transcript(&job, &cancel).await
            }
        }
    }

    async fn transcribe_upload(
        &self,
        payload: AudioPayload,
        cancel: &CancellationToken,
    ) -> Result<Transcript, TranscriptionError> {
        if payload.is_empty() {
            return Err(TranscriptionError::Validation(
                "audio payload is empty".to_string(),
            ));
        }
        if !payload.is_supported_content_type() {
            return Err(TranscriptionError::UnsupportedContentType(
                payload.content_type.clone(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(TranscriptionError::Cancelled);
        }

        let bytes = payload.len();
        let content_type = payload.content_type.clone();
        let staged = self.blob_stage.stage(payload).await.map_err(|e| {
            tracing::error!(
                step = "stage",
                stage = self.blob_stage.name(),
                bytes,
                content_type = %content_type,
                error = %e,
                "Staging audio failed"
            );
            TranscriptionError::Staging(e)
        })?;
        tracing::info!(
            step = "stage",
            stage = self.blob_stage.name(),
            bytes,
            url = %staged.redacted(),
            one_time_use = staged.is_one_time_use(),
            "Audio staged"
        );
        tracing::trace!(url = %staged.url(), "Full staged URL");

        let release = StageRelease::new(Arc::clone(&self.blob_stage), staged.receipt());
        let result = match self.submit(staged, cancel).await {
            Ok(job) => self.await_transcript(&job, cancel).await,
            Err(e) => Err(e),
        };
        release.run().await;
        result
    }

    async fn submit(
        &self,
        staged: StagedAudioRef,
        cancel: &CancellationToken,
    ) -> Result<InferenceJob, TranscriptionError> {
        if cancel.is_cancelled() {
            return Err(TranscriptionError::Cancelled);
        }

        let url = staged.redacted();
        let job = self
            .gateway
            .submit(staged, &self.model_version)
            .await
            .map_err(|e| {
                tracing::error!(
                    step = "submit",
                    model_version = %self.model_version,
                    url = %url,
                    error = %e,
                    "Inference submission failed"
                );
                TranscriptionError::Submission(e)
            })?;

        tracing::info!(
            step = "submit",
            job_id = %job.id,
            model_version = %self.model_version,
            "Inference job submitted"
        );
        Ok(job)
    }

    async fn await_transcript(
        &self,
        job: &InferenceJob,
        cancel: &CancellationToken,
    ) -> Result<Transcript, TranscriptionError> {
        let output = self
            .poller
            .wait_for_completion(job, cancel)
            .await
            .map_err(|e| {
                tracing::error!(step = "poll", job_id = %job.id, error = %e, "Inference job did not succeed");
                TranscriptionError::from_poller(job.id.clone(), e)
            })?;

        let transcript = Transcript::from_output(output).ok_or_else(|| {
            tracing::error!(step = "normalize", job_id = %job.id, "Provider output has no usable transcript");
            TranscriptionError::ProviderReportedFailure {
                job_id: job.id.clone(),
                reason: "provider output has no usable transcript".to_string(),
            }
        })?;

        tracing::info!(
            step = "normalize",
            job_id = %job.id,
            chars = transcript.as_str().len(),
            "Transcription completed"
        );
        Ok(transcript)
    }

}

/// Releases a staged blob exactly once. Normally awaited after the job is
/// terminal; if the request future is dropped first (client disconnect), the
/// release is spawned from `Drop` instead.
struct StageRelease {
    blob_stage: Arc<dyn BlobStage>,
    receipt: Option<StageReceipt>,
}

impl StageRelease {
    fn new(blob_stage: Arc<dyn BlobStage>, receipt: StageReceipt) -> Self {
        Self {
            blob_stage,
            receipt: Some(receipt),
        }
    }

    async fn run(mut self) {
        if let Some(receipt) = self.receipt.take() {
            release_staged(self.blob_stage.as_ref(), &receipt).await;
        }
    }
}

impl Drop for StageRelease {
    fn drop(&mut self) {
        let Some(receipt) = self.receipt.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::info!(
                    step = "release",
                    url = %receipt.redacted(),
                    "Request dropped before completion, releasing staged audio"
                );
                let blob_stage = Arc::clone(&self.blob_stage);
                handle.spawn(async move {
                    release_staged(blob_stage.as_ref(), &receipt).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    step = "release",
                    stage = self.blob_stage.name(),
                    url = %receipt.redacted(),
                    "No runtime left to release staged audio"
                );
            }
        }
    }
}

async fn release_staged(blob_stage: &dyn BlobStage, receipt: &StageReceipt) {
    if let Err(e) = blob_stage.release(receipt).await {
        tracing::warn!(
            step = "release",
            stage = blob_stage.name(),
            url = %receipt.redacted(),
            error = %e,
            "Failed to release staged audio"
        );
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("staging: {0}")]
    Staging(StagingError),
    #[error("submission: {0}")]
    Submission(SubmissionError),
    #[error("polling gave up after {attempts} failed queries for job {job_id}: {source}")]
    Poll {
        job_id: InferenceJobId,
        attempts: u32,
        #[source]
        source: PollError,
    },
    #[error("provider failed job {job_id}: {reason}")]
    ProviderReportedFailure {
        job_id: InferenceJobId,
        reason: String,
    },
    #[error("job {job_id} not finished after {after:?}")]
    Timeout { job_id: InferenceJobId, after: Duration },
    #[error("transcription cancelled")]
    Cancelled,
}

impl TranscriptionError {
    fn from_poller(job_id: InferenceJobId, e: PollerError) -> Self {
        match e {
            PollerError::ProviderFailed { reason } => {
                TranscriptionError::ProviderReportedFailure { job_id, reason }
            }
            PollerError::Transport { attempts, source } => TranscriptionError::Poll {
                job_id,
                attempts,
                source,
            },
            PollerError::TimedOut { after } => TranscriptionError::Timeout { job_id, after },
            PollerError::Cancelled => TranscriptionError::Cancelled,
        }
    }

    /// Short machine-readable tag returned to callers.
    pub fn category(&self) -> &'static str {
        match self {
            TranscriptionError::Validation(_) => "validation_error",
            TranscriptionError::UnsupportedContentType(_) => "unsupported_media_type",
            TranscriptionError::Staging(_) => "staging_error",
            TranscriptionError::Submission(_) => "submission_error",
            TranscriptionError::Poll { .. } => "poll_error",
            TranscriptionError::ProviderReportedFailure { .. } => "provider_failure",
            TranscriptionError::Timeout { .. } => "timeout",
            TranscriptionError::Cancelled => "cancelled",
        }
    }
}

impl From<InvalidAudioUrl> for TranscriptionError {
    fn from(e: InvalidAudioUrl) -> Self {
        TranscriptionError::Validation(e.to_string())
    }
}
