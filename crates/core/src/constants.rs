//! Shared constants for ragchat.
//!
//! Model identifiers, endpoints and fixed user-facing strings live here so the
//! HTTP pages, the CLI and the orchestrators agree on them.

/// Completion model used by every front-end.
pub const DEFAULT_MODEL: &str = "Hermes-3-Llama-3.1-70B";

/// Base URL of the hosted completion service.
pub const DEFAULT_BASE_URL: &str = "https://globalpath.predictionguard.com";

/// System turn that implicitly opens every chat conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that provides clever and sometimes funny responses.";

/// Reply used when retrieval yields no context. The model is not called.
pub const NO_ANSWER_MESSAGE: &str = "Sorry, I couldn't find an answer in the provided data.";

/// Warning shown by the chat page when an empty message is submitted.
pub const EMPTY_MESSAGE_WARNING: &str = "Please enter a message.";

/// Warning shown by the RAG page when no file is loaded or the question is empty.
pub const RAG_NOT_READY_WARNING: &str = "Please upload a CSV file and enter a question.";

/// Token cap for RAG answers.
pub const RAG_MAX_TOKENS: u32 = 100;

/// Sampling temperature for RAG answers.
pub const RAG_TEMPERATURE: f32 = 0.1;

/// Name of the pretrained sentence encoder.
pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L12-v2";

/// Embedding vector dimension of `all-MiniLM-L12-v2`.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Sessions idle longer than this are evicted (seconds).
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Request timeout applied by the completion client (seconds).
pub const COMPLETION_TIMEOUT_SECS: u64 = 60;
