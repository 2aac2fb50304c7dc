//! Request and response models for the triage API.

pub mod patient;

pub use patient::{PatientInfo, RecommendationResponse};
