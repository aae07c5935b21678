mod audio_payload;
mod inference_job;
mod job_status;
mod staged_audio_ref;
mod transcript;

pub use audio_payload::AudioPayload;
pub use inference_job::{InferenceJob, InferenceJobId, ModelVersion};
pub use job_status::JobStatus;
pub use staged_audio_ref::{InvalidAudioUrl, StageReceipt, StagedAudioRef};
pub use transcript::{Transcript, TranscriptOutput};
