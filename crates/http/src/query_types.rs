//! Request types (Deserialize)

use serde::Deserialize;

/// Chat page form.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

/// RAG page question form.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Falls back to the session cookie, then to a new session.
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RagAskRequest {
    pub session_id: Option<String>,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}
