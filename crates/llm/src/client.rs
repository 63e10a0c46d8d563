use std::time::Duration;

use async_trait::async_trait;
use ragchat_core::{COMPLETION_TIMEOUT_SECS, Credentials, Turn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ai_types::{ChatRequest, ChatResponse, CompletionRequest, CompletionResponse, Message};
use crate::backend::{CompletionBackend, GenerationParams};
use crate::error::LlmError;

/// Client for the hosted completion API.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl LlmClient {
    /// Creates a new client with the given API key and base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(COMPLETION_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url })
    }

    /// # Errors
    /// See [`LlmClient::new`].
    pub fn from_credentials(credentials: &Credentials) -> Result<Self, LlmError> {
        Self::new(credentials.api_key().to_owned(), credentials.base_url().to_owned())
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a chat completion request and return the first choice's content.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the API returns a
    /// non-success status, the response body cannot be parsed, or the choices
    /// array is empty.
    pub async fn chat_completion(
        &self,
        messages: &[Turn],
        params: &GenerationParams,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &params.model,
            messages: messages.iter().map(Message::from).collect(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let response: ChatResponse =
            self.post_json("chat/completions", &request, "chat completion response").await?;
        let first_choice = response.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        Ok(first_choice.message.content.trim().to_owned())
    }

    /// Send a prompt completion request and return the first choice's text.
    ///
    /// # Errors
    /// Same failure modes as [`LlmClient::chat_completion`].
    pub async fn text_completion(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: &params.model,
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let response: CompletionResponse =
            self.post_json("completions", &request, "text completion response").await?;
        let first_choice = response.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        Ok(first_choice.text.trim().to_owned())
    }

    async fn post_json<Req, Resp>(
        &self,
        endpoint: &str,
        request: &Req,
        context: &str,
    ) -> Result<Resp, LlmError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(url = %url, "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            tracing::warn!(status = status.as_u16(), "completion service returned an error");
            return Err(LlmError::HttpStatus { code: status.as_u16(), body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
            context: format!("{context} (body: {})", truncate(&body, 200)),
            source: e,
        })
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn chat(&self, messages: &[Turn], params: &GenerationParams) -> Result<String, LlmError> {
        self.chat_completion(messages, params).await
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        self.text_completion(prompt, params).await
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub(crate) fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
