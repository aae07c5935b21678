use std::sync::Arc;

use crate::application::ports::{BlobStage, StagingError};
use crate::presentation::config::{StagingProviderSetting, StagingSettings};

use super::azure_stage::AzureBlobStage;
use super::file_io_stage::FileIoBlobStage;

pub struct BlobStageFactory;

impl BlobStageFactory {
    pub fn create(
        settings: &StagingSettings,
        client: reqwest::Client,
    ) -> Result<Arc<dyn BlobStage>, StagingError> {
        match settings.provider {
            StagingProviderSetting::FileIo => Ok(Arc::new(FileIoBlobStage::new(
                client,
                settings.file_io_endpoint.clone(),
                settings.file_io_expiry.clone(),
            ))),
            StagingProviderSetting::Azure => {
                let account = settings.azure_account.as_deref().ok_or_else(|| {
                    StagingError::Configuration("azure_account required".into())
                })?;
                let key = settings.azure_access_key.as_deref().ok_or_else(|| {
                    StagingError::Configuration("azure_access_key required".into())
                })?;
                let container = settings.azure_container.as_deref().ok_or_else(|| {
                    StagingError::Configuration("azure_container required".into())
                })?;
                let public_base_url = settings.public_base_url.as_deref().ok_or_else(|| {
                    StagingError::Configuration("public_base_url required".into())
                })?;
                let stage = AzureBlobStage::new(account, key, container, public_base_url)?;
                Ok(Arc::new(stage))
            }
        }
    }
}
