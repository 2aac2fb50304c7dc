//! Error translation at the `/recommend` route boundary.

use crate::services::ProviderError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use service_core::error::AppError;
use thiserror::Error;
use utoipa::ToSchema;

/// Prefix of the `detail` message returned when the model call fails.
pub const UPSTREAM_DETAIL_PREFIX: &str =
    "Terjadi kesalahan pada server saat memproses rekomendasi";

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The body was not a JSON `PatientInfo` (syntax, shape or content type).
    #[error("Invalid request body: {0}")]
    Payload(#[from] JsonRejection),

    /// The patient data broke a field constraint; the model was not called.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The completion call failed. Never retried.
    #[error("{0}")]
    Upstream(#[from] ProviderError),
}

/// Body of a 500 response for a failed model call.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpstreamErrorBody {
    #[schema(
        example = "Terjadi kesalahan pada server saat memproses rekomendasi: Rate limited"
    )]
    pub detail: String,
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        match self {
            RecommendError::Payload(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "Validation error",
                    "details": rejection.body_text(),
                })),
            )
                .into_response(),
            RecommendError::Validation(errors) => AppError::ValidationError(errors).into_response(),
            RecommendError::Upstream(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UpstreamErrorBody {
                    detail: format!("{}: {}", UPSTREAM_DETAIL_PREFIX, err),
                }),
            )
                .into_response(),
        }
    }
}
