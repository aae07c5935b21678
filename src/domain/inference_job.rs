use std::fmt;

use super::StagedAudioRef;

/// Provider-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InferenceJobId(String);

impl InferenceJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InferenceJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct InferenceJob {
    pub id: InferenceJobId,
    pub input: StagedAudioRef,
}

impl InferenceJob {
    pub fn new(id: InferenceJobId, input: StagedAudioRef) -> Self {
        Self { id, input }
    }
}

/// Pinned model build identifier. Only ever read from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVersion(String);

impl ModelVersion {
    pub fn new(version: impl Into<String>) -> Option<Self> {
        let version = version.into();
        let trimmed = version.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
