mod azure_stage;
mod file_io_stage;
mod mock_stage;
mod stage_factory;

pub use azure_stage::AzureBlobStage;
pub use file_io_stage::{DEFAULT_FILE_IO_ENDPOINT, FileIoBlobStage};
pub use mock_stage::MockBlobStage;
pub use stage_factory::BlobStageFactory;
