use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use halo_whisper::application::ports::{InferenceGateway, PollError, SubmissionError};
use halo_whisper::application::services::{
    JobPoller, PollPolicy, TranscriptionInput, TranscriptionService,
};
use halo_whisper::domain::{
    AudioPayload, InferenceJob, InferenceJobId, JobStatus, ModelVersion, StagedAudioRef,
    TranscriptOutput,
};
use halo_whisper::infrastructure::inference::ReplicateGateway;
use halo_whisper::infrastructure::storage::MockBlobStage;

const TOKEN: &str = "r8_test_token";

#[derive(Clone, Default)]
struct MockReplicate {
    submitted: Arc<Mutex<Option<(Option<String>, Value)>>>,
    poll_responses: Arc<Mutex<Vec<(u16, Value)>>>,
    polled_ids: Arc<Mutex<Vec<String>>>,
}

impl MockReplicate {
    fn with_polls(responses: Vec<(u16, Value)>) -> Self {
        let mock = Self::default();
        *mock.poll_responses.lock().unwrap() = responses;
        mock
    }
}

async fn create_prediction(
    State(mock): State<MockReplicate>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *mock.submitted.lock().unwrap() = Some((auth.clone(), body));

    if auth.as_deref() != Some(format!("Token {}", TOKEN).as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid token."})),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": "job_1", "status": "starting"})),
    )
}

async fn get_prediction(
    State(mock): State<MockReplicate>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    mock.polled_ids.lock().unwrap().push(id);
    let mut responses = mock.poll_responses.lock().unwrap();
    let (status, body) = if responses.len() > 1 {
        responses.remove(0)
    } else {
        responses
            .first()
            .cloned()
            .unwrap_or((200, json!({"status": "processing"})))
    };
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn start_mock_replicate(mock: MockReplicate) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new()
        .route("/v1/predictions", post(create_prediction))
        .route("/v1/predictions/{id}", get(get_prediction))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/v1", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

fn gateway(base_url: &str, token: &str) -> ReplicateGateway {
    ReplicateGateway::new(
        reqwest::Client::new(),
        Some(base_url.to_string()),
        token.to_string(),
    )
}

fn job(id: &str) -> InferenceJob {
    InferenceJob::new(
        InferenceJobId::new(id),
        StagedAudioRef::new("https://stage.example/abc123"),
    )
}

fn model() -> ModelVersion {
    ModelVersion::new("cfe465e163c985e9").unwrap()
}

#[tokio::test]
async fn given_valid_token_when_submitting_then_returns_job_and_sends_version_and_audio() {
    let mock = MockReplicate::default();
    let (base_url, shutdown_tx) = start_mock_replicate(mock.clone()).await;

    let job = gateway(&base_url, TOKEN)
        .submit(StagedAudioRef::new("https://stage.example/abc123"), &model())
        .await
        .unwrap();

    assert_eq!(job.id.as_str(), "job_1");
    assert_eq!(job.input.url(), "https://stage.example/abc123");
    let (auth, body) = mock.submitted.lock().unwrap().clone().unwrap();
    assert_eq!(auth.as_deref(), Some("Token r8_test_token"));
    assert_eq!(
        body,
        json!({"version": "cfe465e163c985e9", "input": {"audio": "https://stage.example/abc123"}})
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_invalid_token_when_submitting_then_rejected_with_status() {
    let (base_url, shutdown_tx) = start_mock_replicate(MockReplicate::default()).await;

    let result = gateway(&base_url, "wrong")
        .submit(StagedAudioRef::new("https://stage.example/abc123"), &model())
        .await;

    assert!(matches!(
        result,
        Err(SubmissionError::Rejected { status: 401, .. })
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_processing_prediction_when_polling_then_running() {
    let mock = MockReplicate::with_polls(vec![(200, json!({"id": "job_7", "status": "processing"}))]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock.clone()).await;

    let status = gateway(&base_url, TOKEN).poll(&job("job_7")).await.unwrap();

    assert_eq!(status, JobStatus::Running);
    assert_eq!(*mock.polled_ids.lock().unwrap(), vec!["job_7".to_string()]);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_starting_prediction_when_polling_then_pending() {
    let mock = MockReplicate::with_polls(vec![(200, json!({"status": "starting", "output": null}))]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let status = gateway(&base_url, TOKEN).poll(&job("job_1")).await.unwrap();

    assert_eq!(status, JobStatus::Pending);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_string_output_when_polling_then_succeeded_with_text() {
    let mock = MockReplicate::with_polls(vec![(200, json!({"status": "succeeded", "output": "(silence)"}))]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let status = gateway(&base_url, TOKEN).poll(&job("job_1")).await.unwrap();

    assert_eq!(
        status,
        JobStatus::Succeeded {
            output: TranscriptOutput::Text("(silence)".to_string())
        }
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_token_array_output_when_polling_then_succeeded_with_segments() {
    let mock = MockReplicate::with_polls(vec![(
        200,
        json!({"status": "succeeded", "output": ["Hello", " world"]}),
    )]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let status = gateway(&base_url, TOKEN).poll(&job("job_1")).await.unwrap();

    assert_eq!(
        status,
        JobStatus::Succeeded {
            output: TranscriptOutput::Segments(vec!["Hello".to_string(), " world".to_string()])
        }
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_failed_prediction_when_polling_then_failed_with_provider_error() {
    let mock = MockReplicate::with_polls(vec![(
        200,
        json!({"status": "failed", "error": "audio could not be decoded"}),
    )]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let status = gateway(&base_url, TOKEN).poll(&job("job_1")).await.unwrap();

    assert_eq!(
        status,
        JobStatus::Failed {
            reason: "audio could not be decoded".to_string()
        }
    );
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_canceled_prediction_when_polling_then_failed() {
    let mock = MockReplicate::with_polls(vec![(200, json!({"status": "canceled"}))]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let status = gateway(&base_url, TOKEN).poll(&job("job_1")).await.unwrap();

    assert!(matches!(status, JobStatus::Failed { .. }));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unknown_status_when_polling_then_invalid_response() {
    let mock = MockReplicate::with_polls(vec![(200, json!({"status": "teleporting"}))]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let result = gateway(&base_url, TOKEN).poll(&job("job_1")).await;

    assert!(matches!(result, Err(PollError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_server_error_when_polling_then_rejected() {
    let mock = MockReplicate::with_polls(vec![(503, json!({"detail": "overloaded"}))]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock).await;

    let result = gateway(&base_url, TOKEN).poll(&job("job_1")).await;

    assert!(matches!(result, Err(PollError::Rejected { status: 503, .. })));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_unreachable_provider_when_polling_then_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = gateway(&format!("http://{}/v1", addr), TOKEN)
        .poll(&job("job_1"))
        .await;

    assert!(matches!(result, Err(PollError::Request(_))));
}

#[tokio::test]
async fn given_replicate_and_mock_stage_when_transcribing_then_returns_polled_transcript() {
    let mock = MockReplicate::with_polls(vec![
        (200, json!({"status": "processing"})),
        (200, json!({"status": "succeeded", "output": {"transcription": "(silence)"}})),
    ]);
    let (base_url, shutdown_tx) = start_mock_replicate(mock.clone()).await;
    let gateway = Arc::new(gateway(&base_url, TOKEN));
    let poller = JobPoller::new(
        gateway.clone(),
        PollPolicy {
            interval: Duration::from_millis(20),
            timeout: Duration::from_secs(5),
            max_consecutive_errors: 1,
        },
    );
    let service = TranscriptionService::new(
        Arc::new(MockBlobStage::succeeding("https://stage.example")),
        gateway,
        poller,
        model(),
    );

    let transcript = service
        .transcribe(
            TranscriptionInput::Upload(AudioPayload::new(vec![0u8; 16], "audio/webm")),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(transcript.as_str(), "(silence)");
    assert_eq!(mock.polled_ids.lock().unwrap().len(), 2);
    shutdown_tx.send(()).ok();
}
