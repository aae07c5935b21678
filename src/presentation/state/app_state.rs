use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::services::TranscriptionService;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub settings: Settings,
    /// Parent of every per-request token; cancelled on shutdown.
    pub shutdown: CancellationToken,
}
