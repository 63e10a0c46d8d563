//! Vector storage for ragchat
//!
//! `SQLite` + sqlite-vec collections holding ingested rows and their
//! embeddings, with exact nearest-neighbour lookup.

mod backend;
mod error;
mod index;
mod vec_init;
mod vector_store;

pub use error::StorageError;
pub use index::VectorIndex;
pub use vector_store::{CollectionInfo, Neighbor, VectorStore};
