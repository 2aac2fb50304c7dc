pub mod metrics;
pub mod prompt;
pub mod providers;

pub use metrics::{get_metrics, init_metrics};
pub use prompt::{compose_prompt, Prompt};
pub use providers::{ProviderError, TextProvider};
