//! Typed error enum for the vector store.

use thiserror::Error;

/// Vector store error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool exhausted or broken.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Database directory could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Collection names are restricted to `[A-Za-z0-9_]`.
    #[error("invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    /// Vector length does not match the collection.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Zero-length vector supplied.
    #[error("empty embedding")]
    EmptyEmbedding,

    /// Blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}
