#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use triage_service::config::TriageConfig;
use triage_service::services::providers::TextProvider;
use triage_service::startup::{AppState, Application};

pub fn test_config(vars: &[(&str, &str)]) -> TriageConfig {
    let common = CoreConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "error".to_string(),
    };
    let mut vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.entry("GOOGLE_API_KEY".to_string())
        .or_insert_with(|| "test-api-key".to_string());

    TriageConfig::from_lookup(common, |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the service on a random port around the given provider.
    pub async fn spawn(provider: Arc<dyn TextProvider>) -> Self {
        let config = test_config(&[]);
        let state = AppState::new(provider, config.generation_params());
        let app = Application::with_state(&config, state)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    /// Spawn the service exactly as `main` would, from configuration alone.
    pub async fn spawn_from_config(config: TriageConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to answer its liveness probe
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    pub async fn recommend(&self, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/recommend", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// What the stand-in Gemini server should answer.
#[derive(Clone)]
pub enum GeminiReply {
    Text(String),
    Status(u16, String),
}

#[derive(Clone)]
struct FakeGeminiState {
    reply: GeminiReply,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

/// A local server that speaks enough of the Gemini REST API for the provider.
pub struct FakeGemini {
    pub base_url: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeGemini {
    pub async fn start(reply: GeminiReply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeGeminiState {
            reply,
            calls: calls.clone(),
            requests: requests.clone(),
        };

        let router = Router::new()
            .route("/v1beta/models/:method", post(generate_content))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Gemini listener");
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        FakeGemini {
            base_url: format!("http://127.0.0.1:{}/v1beta", port),
            calls,
            requests,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Path segment and JSON body of every request received.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn generate_content(
    State(state): State<FakeGeminiState>,
    axum::extract::Path(method): axum::extract::Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push((method, body));

    match state.reply {
        GeminiReply::Text(text) => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 180, "candidatesTokenCount": 2}
            })),
        ),
        GeminiReply::Status(code, message) => (
            StatusCode::from_u16(code).unwrap(),
            Json(json!({"error": {"code": code, "message": message}})),
        ),
    }
}
