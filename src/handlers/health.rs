//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    models_loaded_at: i64,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        models_loaded_at: state.artifacts.loaded_at.timestamp(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Unknown routes
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
