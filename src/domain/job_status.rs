use super::TranscriptOutput;

/// Point-in-time state of a remote inference job.
///
/// `Succeeded` and `Failed` are terminal; a job never leaves them.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded { output: TranscriptOutput },
    Failed { reason: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded { .. } | JobStatus::Failed { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Succeeded { .. } => "SUCCEEDED",
            JobStatus::Failed { .. } => "FAILED",
        }
    }
}
