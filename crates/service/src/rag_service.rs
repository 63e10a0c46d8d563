use std::sync::Arc;

use ragchat_core::{
    Conversation, DocumentRow, EmptyInputPolicy, FailurePolicy, NO_ANSWER_MESSAGE,
    RAG_MAX_TOKENS, RAG_NOT_READY_WARNING, RAG_TEMPERATURE, Settings, non_blank,
};
use ragchat_embeddings::Embedder;
use ragchat_llm::{CompletionBackend, GenerationParams};
use ragchat_storage::VectorIndex;
use serde::Serialize;
use uuid::Uuid;

use crate::ServiceError;
use crate::chat_service::{on_completion_failure, reject};
use crate::ingest::parse_row_texts;
use crate::outcome::Outcome;
use crate::prompt::build_rag_prompt;

/// Per-session RAG state: the visible conversation and the collection built
/// from this session's upload.
#[derive(Debug, Clone)]
pub struct RagSession {
    id: String,
    collection_name: String,
    collection: Option<String>,
    rows: usize,
    conversation: Conversation,
}

impl RagSession {
    /// Every instance gets its own collection name, so releasing one session
    /// never touches the rows of another, even one reusing the same id.
    #[must_use]
    pub fn new(session_id: &str) -> Self {
        Self {
            id: session_id.to_owned(),
            collection_name: format!("rows_{}", Uuid::new_v4().simple()),
            collection: None,
            rows: 0,
            conversation: Conversation::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Collection holding this session's rows, once a file was ingested.
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.collection.is_some()
    }

    /// Rows stored by the last successful ingestion.
    #[must_use]
    pub fn loaded_rows(&self) -> Option<usize> {
        self.collection.as_ref().map(|_| self.rows)
    }
}

/// Summary of one ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub rows: usize,
    pub dimension: usize,
}

/// RAG orchestrator: ingestion, retrieval, prompt assembly.
pub struct RagService {
    llm: Arc<dyn CompletionBackend>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    params: GenerationParams,
    empty_input: EmptyInputPolicy,
    failure: FailurePolicy,
    max_distance: Option<f32>,
}

impl RagService {
    #[must_use]
    pub fn new(
        llm: Arc<dyn CompletionBackend>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        settings: &Settings,
    ) -> Self {
        Self {
            llm,
            embedder,
            index,
            params: GenerationParams::new(settings.model.clone())
                .with_max_tokens(Some(RAG_MAX_TOKENS))
                .with_temperature(Some(RAG_TEMPERATURE)),
            empty_input: settings.empty_input,
            failure: settings.failure,
            max_distance: settings.max_distance,
        }
    }

    /// Decodes, embeds and stores an uploaded table, replacing whatever the
    /// session had ingested before.
    ///
    /// # Errors
    /// Propagates decoding, embedding and storage failures. The session keeps
    /// its previous collection when ingestion fails.
    pub async fn ingest_csv(
        &self,
        session: &mut RagSession,
        data: &[u8],
    ) -> Result<IngestReport, ServiceError> {
        let texts = parse_row_texts(data)?;
        tracing::info!(collection = %session.collection_name, rows = texts.len(), "generating embeddings");

        let embedder = Arc::clone(&self.embedder);
        let to_embed = texts.clone();
        let vectors = tokio::task::spawn_blocking(move || embedder.embed_batch(&to_embed)).await??;
        if vectors.len() != texts.len() {
            return Err(ServiceError::Ingest(format!(
                "{} embeddings for {} rows",
                vectors.len(),
                texts.len()
            )));
        }

        let dimension = self.embedder.dimension();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(ServiceError::Ingest(format!(
                "embedding has {} dimensions, expected {dimension}",
                bad.len()
            )));
        }
        let rows: Vec<DocumentRow> =
            texts.into_iter().zip(vectors).map(|(text, v)| DocumentRow::new(text, v)).collect();
        let stored = self.index.replace_collection(&session.collection_name, rows).await?;

        session.collection = Some(session.collection_name.clone());
        session.rows = stored;
        tracing::info!(collection = %session.collection_name, rows = stored, "rows stored");
        Ok(IngestReport { collection: session.collection_name.clone(), rows: stored, dimension })
    }

    /// Text of the row nearest to `query`, or `None` when the collection is
    /// empty or the match is beyond the configured distance.
    ///
    /// # Errors
    /// Propagates embedding and storage failures.
    pub async fn retrieve(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Option<String>, ServiceError> {
        let embedder = Arc::clone(&self.embedder);
        let text = query.to_owned();
        let query_vec = tokio::task::spawn_blocking(move || embedder.embed(&text)).await??;

        let Some(neighbor) = self.index.nearest(collection, query_vec).await? else {
            tracing::debug!(collection, "no rows to retrieve from");
            return Ok(None);
        };
        if let Some(max) = self.max_distance {
            if neighbor.distance > f64::from(max) {
                tracing::debug!(collection, distance = neighbor.distance, max, "nearest row too far");
                return Ok(None);
            }
        }
        tracing::debug!(collection, distance = neighbor.distance, "retrieved context");
        Ok(Some(neighbor.text))
    }

    /// Handles one submitted question for the session.
    ///
    /// Rejected (per the empty-input policy) when the question is blank or no
    /// file has been ingested. When retrieval finds nothing the fixed apology
    /// is recorded without calling the model.
    ///
    /// # Errors
    /// Propagates retrieval failures, and completion failures when the
    /// failure policy is `Propagate`.
    pub async fn submit(
        &self,
        session: &mut RagSession,
        question: &str,
    ) -> Result<Outcome, ServiceError> {
        let (Some(collection), Some(_)) = (session.collection.clone(), non_blank(question)) else {
            return Ok(reject(self.empty_input, RAG_NOT_READY_WARNING));
        };

        let reply = match self.retrieve(&collection, question).await? {
            None => NO_ANSWER_MESSAGE.to_owned(),
            Some(context) => {
                let prompt = build_rag_prompt(&context, question);
                tracing::debug!(collection = %collection, "awaiting text completion");
                match self.llm.complete(&prompt, &self.params).await {
                    Ok(reply) => reply,
                    Err(e) => return on_completion_failure(self.failure, e),
                }
            },
        };

        session.conversation.record_exchange(question, reply.clone());
        Ok(Outcome::Answered(reply))
    }

    /// Releases the session's collection.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn end_session(&self, session: RagSession) -> Result<(), ServiceError> {
        if let Some(collection) = session.collection {
            let dropped = self.index.drop_collection(&collection).await?;
            tracing::debug!(collection = %collection, dropped, "session collection released");
        }
        Ok(())
    }
}
