use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{InferenceGateway, PollError, SubmissionError};
use crate::domain::{
    InferenceJob, InferenceJobId, JobStatus, ModelVersion, StagedAudioRef, TranscriptOutput,
};
use crate::infrastructure::observability::sanitize_provider_body;

pub const DEFAULT_REPLICATE_BASE_URL: &str = "https://api.replicate.com/v1";

/// Replicate predictions API: `POST /predictions`, then `GET /predictions/{id}`.
pub struct ReplicateGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ReplicateGateway {
    pub fn new(client: reqwest::Client, base_url: Option<String>, api_token: String) -> Self {
        Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_REPLICATE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_token,
        }
    }

    fn predictions_url(&self) -> String {
        format!("{}/predictions", self.base_url)
    }
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    audio: &'a str,
}

#[derive(Deserialize)]
struct PredictionCreated {
    id: String,
}

#[derive(Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Option<Value>,
}

impl Prediction {
    fn into_status(self) -> Result<JobStatus, PollError> {
        match self.status.as_str() {
            "starting" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Running),
            "succeeded" => Ok(JobStatus::Succeeded {
                output: output_from_value(self.output),
            }),
            "failed" => Ok(JobStatus::Failed {
                reason: self
                    .error
                    .as_ref()
                    .map(error_text)
                    .unwrap_or_else(|| "prediction failed".to_string()),
            }),
            "canceled" => Ok(JobStatus::Failed {
                reason: "prediction canceled".to_string(),
            }),
            other => Err(PollError::InvalidResponse(format!(
                "unknown prediction status: {}",
                other
            ))),
        }
    }
}

fn output_from_value(value: Value) -> TranscriptOutput {
    match value {
        Value::String(text) => TranscriptOutput::Text(text),
        Value::Array(items) if items.iter().all(Value::is_string) => TranscriptOutput::Segments(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        other => TranscriptOutput::Structured(other),
    }
}

fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl InferenceGateway for ReplicateGateway {
    async fn submit(
        &self,
        input: StagedAudioRef,
        model_version: &ModelVersion,
    ) -> Result<InferenceJob, SubmissionError> {
        let body = PredictionRequest {
            version: model_version.as_str(),
            input: PredictionInput { audio: input.url() },
        };

        tracing::debug!(model_version = %model_version, "Creating Replicate prediction");

        let response = self
            .client
            .post(self.predictions_url())
            .header("Authorization", format!("Token {}", self.api_token))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body: sanitize_provider_body(&body),
            });
        }

        let created: PredictionCreated = response.json().await?;
        if created.id.is_empty() {
            return Err(SubmissionError::InvalidResponse(
                "prediction id is empty".to_string(),
            ));
        }

        Ok(InferenceJob::new(InferenceJobId::new(created.id), input))
    }

    async fn poll(&self, job: &InferenceJob) -> Result<JobStatus, PollError> {
        let url = format!("{}/{}", self.predictions_url(), job.id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.api_token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PollError::Rejected {
                status: status.as_u16(),
                body: sanitize_provider_body(&body),
            });
        }

        let prediction: Prediction = response.json().await?;
        prediction.into_status()
    }
}
