//! Async vector index abstraction.

use async_trait::async_trait;
use ragchat_core::DocumentRow;

use crate::error::StorageError;
use crate::vector_store::Neighbor;

/// Collection operations used by ingestion and retrieval.
///
/// The `SQLite` implementation runs each call on the blocking pool.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace the collection wholesale. Returns the number of rows stored.
    async fn replace_collection(
        &self,
        name: &str,
        rows: Vec<DocumentRow>,
    ) -> Result<usize, StorageError>;

    /// Closest row to `query`, or `None` for a missing or empty collection.
    async fn nearest(&self, name: &str, query: Vec<f32>) -> Result<Option<Neighbor>, StorageError>;

    /// Stored texts in insertion order.
    async fn texts(&self, name: &str) -> Result<Vec<String>, StorageError>;

    /// Drop the collection. Returns whether it existed.
    async fn drop_collection(&self, name: &str) -> Result<bool, StorageError>;
}
