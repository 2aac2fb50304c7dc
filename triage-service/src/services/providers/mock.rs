//! Mock provider for tests and offline runs.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use crate::services::prompt::Prompt;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
}

/// Mock text provider returning a canned reply or failure, counting calls.
pub struct MockTextProvider {
    behavior: Behavior,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<Prompt>>,
}

impl MockTextProvider {
    /// Always answer with `reply` (returned verbatim, untrimmed).
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(reply.into()))
    }

    /// Always fail with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The prompt passed to the most recent `generate` call.
    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt
            .lock()
            .ok()
            .and_then(|prompt| prompt.clone())
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.clone());
        }

        match &self.behavior {
            Behavior::Reply(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: (prompt.system.len() + prompt.human.len()) as i32 / 4,
                output_tokens: 1,
                finish_reason: FinishReason::Complete,
            }),
            Behavior::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            system: "system",
            human: "human".to_string(),
        }
    }

    #[tokio::test]
    async fn reply_is_returned_verbatim_and_counted() {
        let provider = MockTextProvider::replying("  Kardiology\n");
        let response = provider
            .generate(&prompt(), &GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(response.text, "  Kardiology\n");
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_prompt(), Some(prompt()));
    }

    #[tokio::test]
    async fn failure_carries_message() {
        let provider = MockTextProvider::failing("quota exceeded");
        let err = provider
            .generate(&prompt(), &GenerationParams::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: quota exceeded");
        assert_eq!(provider.calls(), 1);
    }
}
