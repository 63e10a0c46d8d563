//! Completion API client for ragchat
//!
//! Chat-style and prompt-style requests against the hosted model, one attempt
//! per call.

mod ai_types;
mod backend;
mod client;
mod error;


pub use backend::{CompletionBackend, GenerationParams};
pub use client::LlmClient;
pub use error::LlmError;
