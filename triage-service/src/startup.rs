//! Application startup and lifecycle management.

use crate::config::{ProviderKind, TriageConfig};
use crate::error::UpstreamErrorBody;
use crate::handlers;
use crate::models::{PatientInfo, RecommendationResponse};
use crate::services::init_metrics;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::{GenerationParams, TextProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{http_request_span, request_id_middleware};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Reply given by the mock provider when `TRIAGE_PROVIDER=mock`.
const MOCK_DEPARTMENT: &str = "Penyakit Dalam";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BitHealth AI Triage API",
        description = "Recommends a hospital department from a patient's symptoms using an LLM.",
        version = "1.0.0"
    ),
    paths(
        handlers::recommend::recommend_department,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(PatientInfo, RecommendationResponse, UpstreamErrorBody)),
    tags(
        (name = "Triage", description = "Department recommendation"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

/// Shared application state. Built once at startup, read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub text_provider: Arc<dyn TextProvider>,
    pub generation_params: GenerationParams,
}

impl AppState {
    pub fn new(text_provider: Arc<dyn TextProvider>, generation_params: GenerationParams) -> Self {
        Self {
            text_provider,
            generation_params,
        }
    }

    pub fn from_config(config: &TriageConfig) -> Result<Self, AppError> {
        let text_provider: Arc<dyn TextProvider> = match config.provider {
            ProviderKind::Gemini => {
                let provider = GeminiTextProvider::new(GeminiConfig {
                    api_key: config.google.api_key.clone(),
                    model: config.model.name.clone(),
                    api_base: config.google.api_base.clone(),
                })
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
                tracing::info!(
                    model = %config.model.name,
                    temperature = config.model.temperature,
                    "Initialized Gemini text provider"
                );
                Arc::new(provider)
            }
            ProviderKind::Mock => {
                tracing::warn!("TRIAGE_PROVIDER=mock, recommendations are canned");
                Arc::new(MockTextProvider::replying(MOCK_DEPARTMENT))
            }
        };

        Ok(Self::new(text_provider, config.generation_params()))
    }
}

/// Build the HTTP router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/recommend", post(handlers::recommend_department))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: TriageConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config)?;
        Self::with_state(&config, state).await
    }

    /// Build the application around an existing state (e.g. a mock provider).
    pub async fn with_state(config: &TriageConfig, state: AppState) -> Result<Self, AppError> {
        init_metrics();

        // Port 0 binds a random port for testing
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Triage service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `shutdown` resolves, letting in-flight requests finish.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
