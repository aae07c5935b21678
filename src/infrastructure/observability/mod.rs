mod init_tracing;
mod provider_body_sanitizer;
mod request_id;
mod tracing_config;

pub use init_tracing::init_tracing;
pub use provider_body_sanitizer::sanitize_provider_body;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use tracing_config::TracingConfig;
