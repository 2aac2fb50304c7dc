//! HTTP handlers for the triage service.

pub mod health;
pub mod metrics;
pub mod recommend;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_endpoint;
pub use recommend::recommend_department;
