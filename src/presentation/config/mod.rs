mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DEFAULT_MODEL_VERSION, HostOverrides, InferenceSettings, LoggingSettings, PollingSettings,
    ServerSettings, Settings, SettingsError, StagingProviderSetting, StagingSettings,
};
