use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timeout = state.config.storage.timeout;
    let storage_status = match tokio::time::timeout(timeout, state.storage.check_bucket()).await {
        Ok(Ok(())) => "connected",
        Ok(Err(e)) => {
            tracing::warn!("Storage health check failed: {:#}", e);
            "disconnected"
        }
        Err(_) => {
            tracing::warn!("Storage health check timed out after {:?}", timeout);
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        storage: storage_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
