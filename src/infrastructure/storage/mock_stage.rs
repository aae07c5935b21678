use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::ports::{BlobStage, StagingError};
use crate::domain::{AudioPayload, StageReceipt, StagedAudioRef};

/// In-memory stage that mints `<base_url>/<n>/<file name>` URLs or always fails.
pub struct MockBlobStage {
    base_url: String,
    fail: bool,
    staged: AtomicUsize,
    released: AtomicUsize,
}

impl MockBlobStage {
    pub fn succeeding(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fail: false,
            staged: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::succeeding("https://stage.invalid")
        }
    }

    pub fn stage_count(&self) -> usize {
        self.staged.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStage for MockBlobStage {
    async fn stage(&self, payload: AudioPayload) -> Result<StagedAudioRef, StagingError> {
        let n = self.staged.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(StagingError::Rejected {
                status: 413,
                body: "mock payload too large".to_string(),
            });
        }
        Ok(StagedAudioRef::new(format!(
            "{}/{}/{}",
            self.base_url,
            n,
            payload.file_name_or_default()
        )))
    }

    async fn release(&self, _receipt: &StageReceipt) -> Result<(), StagingError> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
