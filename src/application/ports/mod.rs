mod blob_stage;
mod inference_gateway;

pub use blob_stage::{BlobStage, StagingError};
pub use inference_gateway::{InferenceGateway, PollError, SubmissionError};
