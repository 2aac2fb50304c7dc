use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::startup::AppState;

pub const SERVICE_NAME: &str = "triage-service";

/// Liveness probe. Never touches the model provider.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive")),
    tag = "Observability"
)]
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe: the configured provider must accept its credential.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Provider reachable"),
        (status = 503, description = "Provider unavailable")
    ),
    tag = "Observability"
)]
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.text_provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = state.text_provider.name(), error = %e, "Readiness check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(json!({
        "status": "ready",
        "provider": state.text_provider.name()
    })))
}
