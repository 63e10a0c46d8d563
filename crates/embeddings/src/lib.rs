//! Sentence embeddings for row ingestion and query retrieval.
//!
//! Rows and queries must be encoded by the same model so their vectors share
//! one space; [`EmbeddingService`] pins `all-MiniLM-L12-v2`.

pub mod error;

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use ragchat_core::{EMBEDDING_DIMENSION, EMBEDDING_MODEL_NAME};

pub use error::EmbeddingError;

/// Text encoder used by ingestion and retrieval. Calls are blocking.
pub trait Embedder: Send + Sync {
    /// Encode one text.
    ///
    /// # Errors
    /// Returns an error if the model fails to produce a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Encode many texts, preserving order.
    ///
    /// # Errors
    /// Returns an error if the model fails or returns a different number of
    /// vectors than inputs.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimension(&self) -> usize;
}

/// fastembed-backed encoder.
pub struct EmbeddingService {
    model: Mutex<TextEmbedding>,
}

impl std::fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingService").field("model", &EMBEDDING_MODEL_NAME).finish()
    }
}

impl EmbeddingService {
    /// Loads the model, downloading it into `cache_dir` on first use.
    ///
    /// # Errors
    /// Returns an error if the model files cannot be fetched or loaded.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML12V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let model =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;
        tracing::info!(model = EMBEDDING_MODEL_NAME, dimension = EMBEDDING_DIMENSION, "embedding model loaded");
        Ok(Self { model: Mutex::new(model) })
    }
}

impl Embedder for EmbeddingService {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut batch = self.embed_batch(&[text.to_owned()])?;
        batch.pop().ok_or(EmbeddingError::CountMismatch { expected: 1, got: 0 })
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = self.model.lock().map_err(|_| EmbeddingError::LockPoisoned)?;
        let vectors = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch { expected: texts.len(), got: vectors.len() });
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
