//! Completion backend abstraction.
//!
//! Orchestrators talk to the hosted model through this trait so they can be
//! driven by a scripted backend in tests.

use async_trait::async_trait;
use ragchat_core::Turn;

use crate::error::LlmError;

/// Generation parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerationParams {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into(), max_tokens: None, temperature: None }
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// One request, one attempt. Implementations must not retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Chat-style completion over role-tagged turns. Returns the top choice's
    /// message content, trimmed.
    async fn chat(&self, messages: &[Turn], params: &GenerationParams) -> Result<String, LlmError>;

    /// Prompt-style completion. Returns the top choice's text, trimmed.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError>;
}
