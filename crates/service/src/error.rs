//! Typed error enum for the service layer.
//!
//! Unifies completion, embedding, storage and ingestion failures into a
//! single error type so handlers can map each failure mode explicitly.

use ragchat_embeddings::EmbeddingError;
use ragchat_llm::LlmError;
use ragchat_storage::StorageError;
use thiserror::Error;

/// Service-layer error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Completion API call failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Embedding generation failed.
    #[error("embedding: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Vector store operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Uploaded table could not be decoded.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    /// Embedder returned a different number of vectors than rows.
    #[error("ingestion: {0}")]
    Ingest(String),

    /// Blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(String),
}

impl ServiceError {
    /// Whether this error came from the completion service.
    pub fn is_completion_failure(&self) -> bool {
        matches!(self, Self::Llm(_))
    }

    /// Whether the caller supplied an unreadable file.
    pub fn is_bad_upload(&self) -> bool {
        matches!(self, Self::Csv(_))
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}
