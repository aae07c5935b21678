use std::fmt;
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

use crate::application::services::PollPolicy;
use crate::domain::ModelVersion;
use crate::infrastructure::inference::DEFAULT_REPLICATE_BASE_URL;

use super::Environment;

/// Replicate build of openai/whisper the service was deployed against.
pub const DEFAULT_MODEL_VERSION: &str =
    "cfe465e163c985e9e7c4b9e52ed31c65b6d9b4e23509212efb00f002902586e8";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub inference: InferenceSettings,
    pub polling: PollingSettings,
    pub staging: StagingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Deserialize)]
pub struct InferenceSettings {
    pub base_url: String,
    pub api_token: String,
    pub model_version: String,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for InferenceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceSettings")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("model_version", &self.model_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    pub interval_ms: u64,
    pub timeout_secs: u64,
    pub max_consecutive_errors: u32,
}

impl PollingSettings {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            max_consecutive_errors: self.max_consecutive_errors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingProviderSetting {
    FileIo,
    Azure,
}

#[derive(Clone, Deserialize)]
pub struct StagingSettings {
    pub provider: StagingProviderSetting,
    #[serde(default)]
    pub file_io_endpoint: Option<String>,
    #[serde(default)]
    pub file_io_expiry: Option<String>,
    #[serde(default)]
    pub azure_account: Option<String>,
    #[serde(default)]
    pub azure_access_key: Option<String>,
    #[serde(default)]
    pub azure_container: Option<String>,
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl fmt::Debug for StagingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagingSettings")
            .field("provider", &self.provider)
            .field("file_io_endpoint", &self.file_io_endpoint)
            .field("file_io_expiry", &self.file_io_expiry)
            .field("azure_account", &self.azure_account)
            .field(
                "azure_access_key",
                &self.azure_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("azure_container", &self.azure_container)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Un-prefixed variables set by the hosting platform rather than by us.
#[derive(Debug, Clone, Default)]
pub struct HostOverrides {
    /// `PORT` always decides where the server binds.
    pub port: Option<String>,
    /// `REPLICATE_API_TOKEN`, used when no `inference.api_token` is configured.
    pub api_token: Option<String>,
}

impl HostOverrides {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT").ok(),
            api_token: std::env::var("REPLICATE_API_TOKEN").ok(),
        }
    }
}

impl Settings {
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        Self::load_with(environment, HostOverrides::from_env())
    }

    /// Defaults, then `appsettings.<env>`, then `APP_*` variables
    /// (`APP_INFERENCE__API_TOKEN`, `APP_POLLING__TIMEOUT_SECS`, ...).
    /// A host-provided port overrides all of them.
    pub fn load_with(
        environment: Environment,
        host: HostOverrides,
    ) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.allowed_origins", vec!["*".to_string()])?
            .set_default("server.max_upload_bytes", 25 * 1024 * 1024)?
            .set_default("inference.base_url", DEFAULT_REPLICATE_BASE_URL)?
            .set_default("inference.api_token", "")?
            .set_default("inference.model_version", DEFAULT_MODEL_VERSION)?
            .set_default("inference.request_timeout_secs", 30)?
            .set_default("polling.interval_ms", 1500)?
            .set_default("polling.timeout_secs", 120)?
            .set_default("polling.max_consecutive_errors", 3)?
            .set_default("staging.provider", "file_io")?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", environment == Environment::Prod)?;

        if let Some(port) = host.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(token) = host.api_token {
            builder = builder.set_default("inference.api_token", token)?;
        }

        let settings: Settings = builder
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.inference.api_token.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "inference.api_token is required (APP_INFERENCE__API_TOKEN or REPLICATE_API_TOKEN)"
                    .to_string(),
            ));
        }
        if self.inference.model_version.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "inference.model_version must not be empty".to_string(),
            ));
        }
        if self.polling.interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "polling.interval_ms must be greater than zero".to_string(),
            ));
        }
        if Duration::from_millis(self.polling.interval_ms)
            >= Duration::from_secs(self.polling.timeout_secs)
        {
            return Err(SettingsError::Invalid(
                "polling.interval_ms must be shorter than polling.timeout_secs".to_string(),
            ));
        }
        if self.staging.provider == StagingProviderSetting::Azure {
            let missing: Vec<&str> = [
                ("azure_account", &self.staging.azure_account),
                ("azure_access_key", &self.staging.azure_access_key),
                ("azure_container", &self.staging.azure_container),
                ("public_base_url", &self.staging.public_base_url),
            ]
            .into_iter()
            .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
            .map(|(name, _)| name)
            .collect();
            if !missing.is_empty() {
                return Err(SettingsError::Invalid(format!(
                    "azure staging requires staging.{}",
                    missing.join(", staging.")
                )));
            }
        }
        Ok(())
    }

    pub fn model_version(&self) -> Result<ModelVersion, SettingsError> {
        ModelVersion::new(self.inference.model_version.clone()).ok_or_else(|| {
            SettingsError::Invalid("inference.model_version must not be empty".to_string())
        })
    }

    pub fn inference_request_timeout(&self) -> Duration {
        Duration::from_secs(self.inference.request_timeout_secs)
    }
}
