use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;
use validator::Validate;

use crate::error::RecommendError;
use crate::models::{PatientInfo, RecommendationResponse};
use crate::services::{compose_prompt, metrics};
use crate::startup::AppState;

/// Recommend a specialist department.
///
/// Any body that is not a valid `PatientInfo` is a 422, whatever the reason
/// (bad JSON, wrong content type, missing field, broken constraint).
/// Otherwise it renders the triage prompt and makes exactly one completion
/// call. The model's answer is trimmed and returned as-is.
#[utoipa::path(
    post,
    path = "/recommend",
    request_body = PatientInfo,
    responses(
        (status = 200, description = "Recommended department", body = RecommendationResponse),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Model call failed", body = crate::error::UpstreamErrorBody)
    ),
    tag = "Triage"
)]
#[tracing::instrument(
    skip(state, payload),
    fields(age = tracing::field::Empty, symptom_count = tracing::field::Empty)
)]
pub async fn recommend_department(
    State(state): State<AppState>,
    payload: Result<Json<PatientInfo>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, RecommendError> {
    let patient = match payload {
        Ok(Json(patient)) => patient,
        Err(rejection) => {
            metrics::record_request("rejected");
            return Err(rejection.into());
        }
    };

    if let Err(errors) = patient.validate() {
        metrics::record_request("rejected");
        return Err(errors.into());
    }

    let span = tracing::Span::current();
    span.record("age", patient.age);
    span.record("symptom_count", patient.symptoms.len());

    let prompt = compose_prompt(&patient);
    let provider = state.text_provider.as_ref();

    let started = Instant::now();
    let result = provider.generate(&prompt, &state.generation_params).await;
    metrics::record_provider_latency(
        provider.name(),
        provider.model(),
        started.elapsed().as_secs_f64(),
    );

    match result {
        Ok(completion) => {
            metrics::record_request("success");
            metrics::record_tokens(
                provider.model(),
                completion.input_tokens,
                completion.output_tokens,
            );

            let response = RecommendationResponse::from_completion(&completion.text);
            tracing::info!(
                department = %response.recommended_department,
                finish_reason = completion.finish_reason.as_str(),
                "Recommendation produced"
            );
            Ok(Json(response))
        }
        Err(e) => {
            metrics::record_request("upstream_error");
            metrics::record_provider_error(provider.name(), e.kind());
            tracing::error!(
                provider = provider.name(),
                error = %e,
                "Error calling LLM"
            );
            Err(e.into())
        }
    }
}
