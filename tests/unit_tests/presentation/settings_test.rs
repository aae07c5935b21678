use std::time::Duration;

use halo_whisper::presentation::Environment;
use halo_whisper::presentation::config::{
    DEFAULT_MODEL_VERSION, HostOverrides, InferenceSettings, LoggingSettings, PollingSettings,
    ServerSettings, Settings, SettingsError, StagingProviderSetting, StagingSettings,
};

fn valid_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
            max_upload_bytes: 1024 * 1024,
        },
        inference: InferenceSettings {
            base_url: "https://api.replicate.com/v1".to_string(),
            api_token: "r8_test".to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            request_timeout_secs: 30,
        },
        polling: PollingSettings {
            interval_ms: 1500,
            timeout_secs: 120,
            max_consecutive_errors: 3,
        },
        staging: StagingSettings {
            provider: StagingProviderSetting::FileIo,
            file_io_endpoint: None,
            file_io_expiry: None,
            azure_account: None,
            azure_access_key: None,
            azure_container: None,
            public_base_url: None,
        },
        logging: LoggingSettings {
            level: "info".to_string(),
            enable_json: false,
        },
    }
}

#[test]
fn given_complete_settings_when_validating_then_ok() {
    assert!(valid_settings().validate().is_ok());
}

#[test]
fn given_missing_api_token_when_validating_then_invalid() {
    let mut settings = valid_settings();
    settings.inference.api_token = " ".to_string();

    let err = settings.validate().unwrap_err();

    assert!(matches!(err, SettingsError::Invalid(ref msg) if msg.contains("api_token")));
}

#[test]
fn given_empty_model_version_when_validating_then_invalid() {
    let mut settings = valid_settings();
    settings.inference.model_version = String::new();

    assert!(settings.validate().is_err());
    assert!(settings.model_version().is_err());
}

#[test]
fn given_interval_longer_than_timeout_when_validating_then_invalid() {
    let mut settings = valid_settings();
    settings.polling.interval_ms = 5000;
    settings.polling.timeout_secs = 2;

    assert!(settings.validate().is_err());
}

#[test]
fn given_zero_interval_when_validating_then_invalid() {
    let mut settings = valid_settings();
    settings.polling.interval_ms = 0;

    assert!(settings.validate().is_err());
}

#[test]
fn given_azure_staging_without_credentials_when_validating_then_names_missing_keys() {
    let mut settings = valid_settings();
    settings.staging.provider = StagingProviderSetting::Azure;
    settings.staging.azure_account = Some("halo".to_string());

    let err = settings.validate().unwrap_err().to_string();

    assert!(err.contains("staging.azure_access_key"));
    assert!(err.contains("staging.azure_container"));
    assert!(err.contains("staging.public_base_url"));
    assert!(!err.contains("staging.azure_account"));
}

#[test]
fn given_polling_settings_when_building_policy_then_durations_match() {
    let policy = valid_settings().polling.policy();

    assert_eq!(policy.interval, Duration::from_millis(1500));
    assert_eq!(policy.timeout, Duration::from_secs(120));
    assert_eq!(policy.max_consecutive_errors, 3);
}

#[test]
fn given_settings_when_debug_formatted_then_api_token_is_hidden() {
    let debug = format!("{:?}", valid_settings());

    assert!(!debug.contains("r8_test"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn given_host_port_when_loading_local_settings_then_port_overrides_appsettings_file() {
    let settings = Settings::load_with(
        Environment::Local,
        HostOverrides {
            port: Some("7123".to_string()),
            api_token: Some("r8_test".to_string()),
        },
    )
    .unwrap();

    assert_eq!(settings.server.port, 7123);
    assert_eq!(settings.server.allowed_origins, vec!["http://localhost:5173".to_string()]);
}

#[test]
fn given_no_host_port_when_loading_local_settings_then_appsettings_port_is_used() {
    let settings = Settings::load_with(
        Environment::Local,
        HostOverrides {
            port: None,
            api_token: Some("r8_test".to_string()),
        },
    )
    .unwrap();

    assert_eq!(settings.server.port, 5000);
    assert_eq!(settings.inference.api_token, "r8_test");
}
