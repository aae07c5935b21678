mod error_response;
mod health;
mod transcribe;

pub use error_response::{ErrorResponse, message_for, status_for};
pub use health::{health_handler, home_handler};
pub use transcribe::{AudioUrlRequest, TranscribeRequest, TranscribeResponse, transcribe_handler};
