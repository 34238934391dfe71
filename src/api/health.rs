//! Health check endpoints

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub version: String,
}

/// GET /health - returns 200 whenever the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// GET /live - bare liveness probe
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
