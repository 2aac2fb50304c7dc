//! End-to-end tests of the Gemini provider against a local stand-in server.

mod common;

use common::{test_config, FakeGemini, GeminiReply, TestApp};
use serde_json::json;

fn canonical_patient() -> serde_json::Value {
    json!({
        "gender": "female",
        "age": 62,
        "symptoms": ["pusing", "mual", "sulit berjalan"]
    })
}

#[tokio::test]
async fn recommendation_flows_through_gemini_api() {
    let gemini = FakeGemini::start(GeminiReply::Text("Neurology\n".to_string())).await;
    let app = TestApp::spawn_from_config(test_config(&[
        ("GEMINI_API_BASE", gemini.base_url.as_str()),
        ("LLM_MODEL_NAME", "gemini-test-model"),
    ]))
    .await;

    let response = app.recommend(canonical_patient()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"recommended_department": "Neurology"}));
    assert_eq!(gemini.calls(), 1);

    let (method, request) = gemini.requests().remove(0);
    assert_eq!(method, "gemini-test-model:generateContent");
    assert_eq!(
        request["contents"][0]["parts"][0]["text"],
        "Data Pasien:\n- Jenis Kelamin: female\n- Usia: 62 tahun\n- Gejala: pusing, mual, sulit berjalan"
    );
    assert!(request["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Jangan berikan penjelasan"));
    let temperature = request["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.2).abs() < 1e-6);
}

#[tokio::test]
async fn empty_model_answer_is_returned_as_empty_department() {
    let gemini = FakeGemini::start(GeminiReply::Text(String::new())).await;
    let app = TestApp::spawn_from_config(test_config(&[(
        "GEMINI_API_BASE",
        gemini.base_url.as_str(),
    )]))
    .await;

    let response = app.recommend(canonical_patient()).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"recommended_department": ""}));
    assert_eq!(gemini.calls(), 1);
}

#[tokio::test]
async fn gemini_error_is_reported_once_without_retry() {
    let gemini = FakeGemini::start(GeminiReply::Status(
        403,
        "API key not valid. Please pass a valid API key.".to_string(),
    ))
    .await;
    let app = TestApp::spawn_from_config(test_config(&[(
        "GEMINI_API_BASE",
        gemini.base_url.as_str(),
    )]))
    .await;

    let response = app.recommend(canonical_patient()).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Terjadi kesalahan pada server saat memproses rekomendasi: "));
    assert!(detail.contains("API key not valid"));
    assert_eq!(gemini.calls(), 1);
}

#[tokio::test]
async fn rate_limit_is_surfaced_as_server_error() {
    let gemini = FakeGemini::start(GeminiReply::Status(429, "quota".to_string())).await;
    let app = TestApp::spawn_from_config(test_config(&[(
        "GEMINI_API_BASE",
        gemini.base_url.as_str(),
    )]))
    .await;

    let response = app.recommend(canonical_patient()).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().ends_with(": Rate limited"));
    assert_eq!(gemini.calls(), 1);
}

#[tokio::test]
async fn readiness_fails_when_gemini_rejects_model_listing() {
    // The stand-in only serves generateContent, so listing models is a 404
    let gemini = FakeGemini::start(GeminiReply::Text("Neurology".to_string())).await;
    let app = TestApp::spawn_from_config(test_config(&[(
        "GEMINI_API_BASE",
        gemini.base_url.as_str(),
    )]))
    .await;

    let response = reqwest::Client::new()
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Service unavailable");
    assert_eq!(gemini.calls(), 0);
}

#[tokio::test]
async fn invalid_request_never_reaches_gemini() {
    let gemini = FakeGemini::start(GeminiReply::Text("Neurology".to_string())).await;
    let app = TestApp::spawn_from_config(test_config(&[(
        "GEMINI_API_BASE",
        gemini.base_url.as_str(),
    )]))
    .await;

    let response = app
        .recommend(json!({"gender": "female", "age": 62, "symptoms": []}))
        .await;

    assert_eq!(response.status().as_u16(), 422);
    assert_eq!(gemini.calls(), 0);
}
