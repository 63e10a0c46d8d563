//! Scripted collaborators for orchestrator tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragchat_core::{Settings, Turn};
use ragchat_embeddings::{Embedder, EmbeddingError};
use ragchat_llm::{CompletionBackend, GenerationParams, LlmError};
use ragchat_storage::VectorStore;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub(crate) enum Call {
    Chat { messages: Vec<Turn>, params: GenerationParams },
    Complete { prompt: String, params: GenerationParams },
}

/// Backend that answers from a queue and records every request.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub(crate) fn replying(replies: &[&str]) -> Arc<Self> {
        let backend = Self::default();
        backend.replies.lock().unwrap().extend(replies.iter().map(|r| Ok((*r).to_owned())));
        Arc::new(backend)
    }

    /// Every call fails as if the service were unreachable.
    pub(crate) fn failing() -> Arc<Self> {
        let backend = Self::default();
        backend
            .replies
            .lock()
            .unwrap()
            .push_back(Err(LlmError::HttpStatus { code: 502, body: "bad gateway".to_owned() }));
        Arc::new(backend)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, LlmError> {
        self.replies.lock().unwrap().pop_front().unwrap_or(Err(LlmError::EmptyResponse))
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn chat(&self, messages: &[Turn], params: &GenerationParams) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Chat { messages: messages.to_vec(), params: params.clone() });
        self.next_reply()
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Complete { prompt: prompt.to_owned(), params: params.clone() });
        self.next_reply()
    }
}

/// Bag-of-words encoder over a tiny fixed vocabulary; other tokens are ignored.
pub(crate) struct KeywordEmbedder;

const VOCAB: [&str; 6] = ["a", "b", "c", "us", "ca", "uk"];

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut v = vec![0.0_f32; VOCAB.len()];
        for token in text.split(|c: char| !c.is_ascii_alphanumeric()) {
            let token = token.to_ascii_lowercase();
            if let Some(i) = VOCAB.iter().position(|w| *w == token) {
                v[i] += 1.0;
            }
        }
        Ok(v)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        VOCAB.len()
    }
}

pub(crate) fn temp_store() -> (Arc<VectorStore>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = VectorStore::open(&dir.path().join("vectors.db")).unwrap();
    (Arc::new(store), dir)
}

pub(crate) fn settings() -> Settings {
    Settings { model: "test-model".to_owned(), ..Settings::default() }
}
