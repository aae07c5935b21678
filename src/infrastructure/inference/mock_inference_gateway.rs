use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::ports::{InferenceGateway, PollError, SubmissionError};
use crate::domain::{
    InferenceJob, InferenceJobId, JobStatus, ModelVersion, StagedAudioRef, TranscriptOutput,
};

/// One scripted answer to a status query.
#[derive(Debug, Clone)]
pub enum ScriptedPoll {
    Pending,
    Running,
    Succeeded(TranscriptOutput),
    /// Succeeds with `transcript of <audio url>`, so concurrent jobs can be told apart.
    SucceededEcho,
    Failed(String),
    TransportError,
}

/// In-memory gateway. Each job walks the same script; the last entry repeats.
/// Job ids are `job_1`, `job_2`, ... in submission order.
pub struct MockInferenceGateway {
    script: Vec<ScriptedPoll>,
    reject_submissions: bool,
    submissions: AtomicUsize,
    polls: AtomicUsize,
    jobs: Mutex<HashMap<InferenceJobId, usize>>,
}

impl MockInferenceGateway {
    pub fn new(script: Vec<ScriptedPoll>) -> Self {
        Self {
            script,
            reject_submissions: false,
            submissions: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn succeeding(text: &str) -> Self {
        Self::new(vec![ScriptedPoll::Succeeded(TranscriptOutput::Text(
            text.to_string(),
        ))])
    }

    pub fn rejecting_submissions() -> Self {
        Self {
            reject_submissions: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn polls_for(&self, job_id: &str) -> usize {
        self.jobs
            .lock()
            .map(|jobs| {
                jobs.get(&InferenceJobId::new(job_id))
                    .copied()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl InferenceGateway for MockInferenceGateway {
    async fn submit(
        &self,
        input: StagedAudioRef,
        _model_version: &ModelVersion,
    ) -> Result<InferenceJob, SubmissionError> {
        if self.reject_submissions {
            return Err(SubmissionError::Rejected {
                status: 422,
                body: "mock rejection".to_string(),
            });
        }

        let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        let id = InferenceJobId::new(format!("job_{}", n));
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.insert(id.clone(), 0);
        }
        Ok(InferenceJob::new(id, input))
    }

    async fn poll(&self, job: &InferenceJob) -> Result<JobStatus, PollError> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let index = {
            let mut jobs = self
                .jobs
                .lock()
                .map_err(|e| PollError::Request(e.to_string()))?;
            let count = jobs
                .get_mut(&job.id)
                .ok_or_else(|| PollError::Rejected {
                    status: 404,
                    body: format!("unknown job {}", job.id),
                })?;
            *count += 1;
            *count - 1
        };

        let step = self
            .script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or(ScriptedPoll::Pending);

        match step {
            ScriptedPoll::Pending => Ok(JobStatus::Pending),
            ScriptedPoll::Running => Ok(JobStatus::Running),
            ScriptedPoll::Succeeded(output) => Ok(JobStatus::Succeeded { output }),
            ScriptedPoll::SucceededEcho => Ok(JobStatus::Succeeded {
                output: TranscriptOutput::Text(format!("transcript of {}", job.input.url())),
            }),
            ScriptedPoll::Failed(reason) => Ok(JobStatus::Failed { reason }),
            ScriptedPoll::TransportError => {
                Err(PollError::Request("mock connection reset".to_string()))
            }
        }
    }
}
