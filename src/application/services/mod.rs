mod job_poller;
mod transcription_service;

pub use job_poller::{JobPoller, PollPolicy, PollerError};
pub use transcription_service::{TranscriptionError, TranscriptionInput, TranscriptionService};
