use std::sync::Arc;

use async_trait::async_trait;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path as StorePath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use uuid::Uuid;

use crate::application::ports::{BlobStage, StagingError};
use crate::domain::{AudioPayload, StageReceipt, StagedAudioRef};

const BLOB_PREFIX: &str = "transcriptions";

/// Stages audio in an Azure container that is readable at `public_base_url`.
/// Blobs are deleted on release.
pub struct AzureBlobStage {
    inner: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl AzureBlobStage {
    pub fn new(
        account: &str,
        access_key: &str,
        container: &str,
        public_base_url: &str,
    ) -> Result<Self, StagingError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| StagingError::Configuration(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), public_base_url))
    }

    pub fn with_store(inner: Arc<dyn ObjectStore>, public_base_url: &str) -> Self {
        Self {
            inner,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, url: &str) -> Option<StorePath> {
        url.strip_prefix(&self.public_base_url)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|rest| rest.starts_with(BLOB_PREFIX))
            .map(StorePath::from)
    }
}

#[async_trait]
impl BlobStage for AzureBlobStage {
    async fn stage(&self, payload: AudioPayload) -> Result<StagedAudioRef, StagingError> {
        let blob_name = format!(
            "{}/{}.{}",
            BLOB_PREFIX,
            Uuid::new_v4(),
            payload.file_extension()
        );
        let store_path = StorePath::from(blob_name.as_str());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, payload.content_type.clone().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&store_path, PutPayload::from(payload.bytes), options)
            .await
            .map_err(|e| StagingError::Storage(e.to_string()))?;

        Ok(StagedAudioRef::new(format!(
            "{}/{}",
            self.public_base_url, blob_name
        )))
    }

    async fn release(&self, receipt: &StageReceipt) -> Result<(), StagingError> {
        let Some(store_path) = self.path_for(receipt.url()) else {
            return Err(StagingError::Storage(format!(
                "not a blob of this stage: {}",
                receipt.redacted()
            )));
        };
        self.inner
            .delete(&store_path)
            .await
            .map_err(|e| StagingError::Storage(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "azure"
    }
}
