use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use halo_whisper::application::services::{JobPoller, TranscriptionService};
use halo_whisper::infrastructure::inference::ReplicateGateway;
use halo_whisper::infrastructure::observability::{TracingConfig, init_tracing};
use halo_whisper::infrastructure::storage::BlobStageFactory;
use halo_whisper::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig::from_settings(environment.as_str(), &settings.logging),
        settings.server.port,
    );
    tracing::debug!(?settings, "Configuration loaded");

    let http_client = reqwest::Client::builder()
        .timeout(settings.inference_request_timeout())
        .build()?;

    let blob_stage = BlobStageFactory::create(&settings.staging, http_client.clone())?;
    let gateway = Arc::new(ReplicateGateway::new(
        http_client,
        Some(settings.inference.base_url.clone()),
        settings.inference.api_token.clone(),
    ));
    let poller = JobPoller::new(gateway.clone(), settings.polling.policy());
    let model_version = settings.model_version()?;

    tracing::info!(
        stage = blob_stage.name(),
        model_version = %model_version,
        poll_interval_ms = settings.polling.interval_ms,
        poll_timeout_secs = settings.polling.timeout_secs,
        "Transcription pipeline configured"
    );

    let transcription_service = Arc::new(TranscriptionService::new(
        blob_stage,
        gateway,
        poller,
        model_version,
    ));

    let shutdown = CancellationToken::new();
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;

    let state = AppState {
        transcription_service,
        settings,
        shutdown: shutdown.clone(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown requested, cancelling in-flight transcriptions");
    shutdown.cancel();
}
