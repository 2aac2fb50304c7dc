//! Prometheus metrics for triage-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static TRIAGE_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static TRIAGE_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize all metrics. Calling it again is a no-op.
pub fn init_metrics() {
    INIT.call_once(register_metrics);
}

fn register_metrics() {
    let registry = Registry::new();

    let requests = IntCounterVec::new(
        Opts::new("triage_requests_total", "Total triage recommendation requests"),
        &["outcome"], // outcome: success, rejected, upstream_error
    )
    .expect("Failed to create triage_requests_total metric");

    let tokens = IntCounterVec::new(
        Opts::new("triage_tokens_total", "Total model tokens processed"),
        &["model", "type"], // type: input, output
    )
    .expect("Failed to create triage_tokens_total metric");

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "triage_provider_latency_seconds",
            "Completion provider latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )
    .expect("Failed to create triage_provider_latency_seconds metric");

    let provider_errors = IntCounterVec::new(
        Opts::new("triage_provider_errors_total", "Total completion provider errors"),
        &["provider", "error_type"],
    )
    .expect("Failed to create triage_provider_errors_total metric");

    registry
        .register(Box::new(requests.clone()))
        .expect("Failed to register triage_requests_total");
    registry
        .register(Box::new(tokens.clone()))
        .expect("Failed to register triage_tokens_total");
    registry
        .register(Box::new(provider_latency.clone()))
        .expect("Failed to register triage_provider_latency_seconds");
    registry
        .register(Box::new(provider_errors.clone()))
        .expect("Failed to register triage_provider_errors_total");

    let _ = REGISTRY.set(registry);
    let _ = TRIAGE_REQUESTS_TOTAL.set(requests);
    let _ = TRIAGE_TOKENS_TOTAL.set(tokens);
    let _ = PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = PROVIDER_ERRORS_TOTAL.set(provider_errors);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record the outcome of a `/recommend` request.
pub fn record_request(outcome: &str) {
    if let Some(counter) = TRIAGE_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Record token usage for a completed model call.
pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = TRIAGE_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

/// Record provider call latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}
