use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Patient data submitted for triage.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "gender": "female",
    "age": 62,
    "symptoms": ["pusing", "mual", "sulit berjalan"]
}))]
pub struct PatientInfo {
    /// Patient gender, free-form (e.g. "female", "male").
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,

    /// Age in years.
    #[validate(range(min = 1, message = "Age must be greater than 0"))]
    #[schema(minimum = 1)]
    pub age: i64,

    /// Reported symptoms, in the order the patient gave them.
    #[validate(length(min = 1, message = "At least one symptom is required"))]
    #[schema(min_items = 1)]
    pub symptoms: Vec<String>,
}

/// The recommended specialist department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResponse {
    #[schema(example = "Neurology")]
    pub recommended_department: String,
}

impl RecommendationResponse {
    /// Wrap raw model output, stripping surrounding whitespace.
    pub fn from_completion(raw: &str) -> Self {
        Self {
            recommended_department: raw.trim().to_string(),
        }
    }
}
