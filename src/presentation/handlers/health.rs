use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub message: String,
}

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

pub async fn home_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HomeResponse {
            message: "HALO Whisper backend is running!".to_string(),
        }),
    )
}
