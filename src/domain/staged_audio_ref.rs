use std::fmt;

use chrono::{DateTime, Utc};
use url::{ParseError, Url};

/// A URL at which staged audio can be fetched by the inference provider.
///
/// Anyone holding the URL can download the recording, so it is treated as a
/// capability: `Debug` and [`StagedAudioRef::redacted`] only expose the host.
#[derive(PartialEq, Eq)]
pub struct StagedAudioRef {
    url: String,
    one_time_use: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl StagedAudioRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            one_time_use: false,
            expires_at: None,
        }
    }

    /// Builds a reference for audio the caller already made public.
    pub fn caller_provided(url: &str) -> Result<Self, InvalidAudioUrl> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(InvalidAudioUrl::Empty);
        }
        // The URL parser silently strips tabs and newlines.
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidAudioUrl::Malformed(
                "contains control characters".to_string(),
            ));
        }

        let parsed = Url::parse(trimmed).map_err(|e| match e {
            ParseError::RelativeUrlWithoutBase => InvalidAudioUrl::NotAbsolute,
            ParseError::EmptyHost => InvalidAudioUrl::MissingHost,
            other => InvalidAudioUrl::Malformed(other.to_string()),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(InvalidAudioUrl::UnsupportedScheme(
                parsed.scheme().to_string(),
            ));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(InvalidAudioUrl::MissingHost);
        }

        Ok(Self::new(String::from(parsed)))
    }

    pub fn one_time_use(mut self) -> Self {
        self.one_time_use = true;
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_one_time_use(&self) -> bool {
        self.one_time_use
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// `scheme://host/…`, safe to put in logs.
    pub fn redacted(&self) -> String {
        redact(&self.url)
    }

    /// What the stage needs to delete the blob once this reference has been
    /// handed to the provider.
    pub fn receipt(&self) -> StageReceipt {
        StageReceipt {
            url: self.url.clone(),
        }
    }
}

impl fmt::Debug for StagedAudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedAudioRef")
            .field("url", &self.redacted())
            .field("one_time_use", &self.one_time_use)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Handle kept by the orchestrator to release a staged blob after the
/// [`StagedAudioRef`] itself was moved into a submission.
#[derive(Clone, PartialEq, Eq)]
pub struct StageReceipt {
    url: String,
}

impl StageReceipt {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn redacted(&self) -> String {
        redact(&self.url)
    }
}

impl fmt::Debug for StageReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StageReceipt").field(&self.redacted()).finish()
    }
}

fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}://{}/…", parsed.scheme(), host),
            None => format!("{}:…", parsed.scheme()),
        },
        Err(_) => "[REDACTED]".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAudioUrl {
    #[error("audio_url is empty")]
    Empty,
    #[error("audio_url must be an absolute URL")]
    NotAbsolute,
    #[error("audio_url is not a valid URL: {0}")]
    Malformed(String),
    #[error("audio_url scheme not supported: {0}")]
    UnsupportedScheme(String),
    #[error("audio_url has no host")]
    MissingHost,
}
