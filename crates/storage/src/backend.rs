use async_trait::async_trait;
use ragchat_core::DocumentRow;

use crate::error::StorageError;
use crate::index::VectorIndex;
use crate::vector_store::{Neighbor, VectorStore};

#[async_trait]
impl VectorIndex for VectorStore {
    async fn replace_collection(
        &self,
        name: &str,
        rows: Vec<DocumentRow>,
    ) -> Result<usize, StorageError> {
        let store = self.clone();
        let name = name.to_owned();
        tokio::task::spawn_blocking(move || store.replace_collection(&name, &rows)).await?
    }

    async fn nearest(&self, name: &str, query: Vec<f32>) -> Result<Option<Neighbor>, StorageError> {
        let store = self.clone();
        let name = name.to_owned();
        tokio::task::spawn_blocking(move || store.nearest(&name, &query)).await?
    }

    async fn texts(&self, name: &str) -> Result<Vec<String>, StorageError> {
        let store = self.clone();
        let name = name.to_owned();
        tokio::task::spawn_blocking(move || store.texts(&name)).await?
    }

    async fn drop_collection(&self, name: &str) -> Result<bool, StorageError> {
        let store = self.clone();
        let name = name.to_owned();
        tokio::task::spawn_blocking(move || store.drop_collection(&name)).await?
    }
}
