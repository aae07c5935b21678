use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{InferenceGateway, PollError};
use crate::domain::{InferenceJob, JobStatus, TranscriptOutput};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_consecutive_errors: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }
}

/// Drives a submitted job to a terminal state with a fixed inter-poll delay.
///
/// The loop is bounded by `PollPolicy::timeout` and stops as soon as the
/// cancellation token fires. Transport errors are retried until
/// `max_consecutive_errors` is exceeded; any successful poll resets the count.
pub struct JobPoller {
    gateway: Arc<dyn InferenceGateway>,
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(gateway: Arc<dyn InferenceGateway>, policy: PollPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub async fn wait_for_completion(
        &self,
        job: &InferenceJob,
        cancel: &CancellationToken,
    ) -> Result<TranscriptOutput, PollerError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %job.id, "Polling cancelled");
                Err(PollerError::Cancelled)
            }
            bounded = tokio::time::timeout(self.policy.timeout, self.poll_until_terminal(job)) => {
                bounded.unwrap_or_else(|_| {
                    tracing::warn!(
                        job_id = %job.id,
                        timeout_ms = self.policy.timeout.as_millis() as u64,
                        "Job did not reach a terminal state in time"
                    );
                    Err(PollerError::TimedOut { after: self.policy.timeout })
                })
            }
        }
    }

    async fn poll_until_terminal(&self, job: &InferenceJob) -> Result<TranscriptOutput, PollerError> {
        let mut attempt: u32 = 0;
        let mut consecutive_errors: u32 = 0;

        loop {
            attempt += 1;

            match self.gateway.poll(job).await {
                Ok(JobStatus::Succeeded { output }) => {
                    tracing::debug!(job_id = %job.id, attempt, "Job succeeded");
                    return Ok(output);
                }
                Ok(JobStatus::Failed { reason }) => {
                    tracing::warn!(job_id = %job.id, attempt, reason = %reason, "Provider reported job failure");
                    return Err(PollerError::ProviderFailed { reason });
                }
                Ok(status) => {
                    consecutive_errors = 0;
                    tracing::debug!(job_id = %job.id, attempt, status = status.as_str(), "Job not finished yet");
                }
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors > self.policy.max_consecutive_errors {
                        tracing::error!(
                            job_id = %job.id,
                            attempt,
                            consecutive_errors,
                            error = %e,
                            "Status query failed past retry budget"
                        );
                        return Err(PollerError::Transport {
                            attempts: consecutive_errors,
                            source: e,
                        });
                    }
                    tracing::warn!(
                        job_id = %job.id,
                        attempt,
                        consecutive_errors,
                        error = %e,
                        "Status query failed, retrying"
                    );
                }
            }

            tokio::time::sleep(self.policy.interval).await;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("provider reported failure: {reason}")]
    ProviderFailed { reason: String },
    #[error("status query failed {attempts} times in a row: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: PollError,
    },
    #[error("job not terminal after {after:?}")]
    TimedOut { after: Duration },
    #[error("polling cancelled")]
    Cancelled,
}
