mod mock_inference_gateway;
mod replicate_gateway;

pub use mock_inference_gateway::{MockInferenceGateway, ScriptedPoll};
pub use replicate_gateway::{DEFAULT_REPLICATE_BASE_URL, ReplicateGateway};
