#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use ragchat_core::{
    FailurePolicy, NO_ANSWER_MESSAGE, RAG_MAX_TOKENS, RAG_NOT_READY_WARNING, Settings,
};
use ragchat_embeddings::{Embedder, EmbeddingError};
use ragchat_storage::VectorStore;
use tempfile::TempDir;

use crate::test_support::{Call, KeywordEmbedder, ScriptedBackend, settings, temp_store};
use crate::{Outcome, RagService, RagSession, ServiceError};

const COUNTRIES_CSV: &[u8] = b"name,country\nA,US\nB,CA\nC,UK";

fn service(
    backend: Arc<ScriptedBackend>,
    settings: &Settings,
) -> (RagService, Arc<VectorStore>, TempDir) {
    let (store, dir) = temp_store();
    let rag = RagService::new(backend, Arc::new(KeywordEmbedder), store.clone(), settings);
    (rag, store, dir)
}

#[tokio::test]
async fn scenario_retrieves_matching_row_into_prompt() {
    let backend = ScriptedBackend::replying(&["B is from Canada."]);
    let (rag, _store, _dir) = service(backend.clone(), &settings());
    let mut session = RagSession::new("s1");

    let report = rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();
    assert_eq!(report.rows, 3);
    assert_eq!(report.dimension, KeywordEmbedder.dimension());
    assert_eq!(session.loaded_rows(), Some(3));

    let context = rag.retrieve(session.collection().unwrap(), "Where is B from?").await.unwrap();
    assert_eq!(context.as_deref(), Some("B CA"));

    let outcome = rag.submit(&mut session, "Where is B from?").await.unwrap();
    assert_eq!(outcome, Outcome::Answered("B is from Canada.".to_owned()));
    assert_eq!(session.conversation().len(), 2);

    let calls = backend.calls();
    let Call::Complete { prompt, params } = &calls[0] else {
        panic!("expected prompt completion");
    };
    assert!(prompt.contains("B CA"));
    assert!(prompt.contains("Where is B from?"));
    assert_eq!(params.max_tokens, Some(RAG_MAX_TOKENS));
    assert!(params.temperature.is_some());
}

#[tokio::test]
async fn ingesting_same_file_twice_matches_ingesting_once() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");

    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();
    let once = store.texts(session.collection().unwrap()).unwrap();
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();
    let twice = store.texts(session.collection().unwrap()).unwrap();

    assert_eq!(once, vec!["A US", "B CA", "C UK"]);
    assert_eq!(once, twice);
}

#[tokio::test]
async fn new_upload_replaces_previous_rows() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");

    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();
    rag.ingest_csv(&mut session, b"code\nUK\n").await.unwrap();

    assert_eq!(store.texts(session.collection().unwrap()).unwrap(), vec!["UK"]);
}

#[tokio::test]
async fn empty_collection_yields_apology_without_model_call() {
    let backend = ScriptedBackend::replying(&["should not be used"]);
    let (rag, _store, _dir) = service(backend.clone(), &settings());
    let mut session = RagSession::new("s1");

    let report = rag.ingest_csv(&mut session, b"name,country\n").await.unwrap();
    assert_eq!(report.rows, 0);

    let outcome = rag.submit(&mut session, "Where is B from?").await.unwrap();
    assert_eq!(outcome, Outcome::Answered(NO_ANSWER_MESSAGE.to_owned()));
    assert!(backend.calls().is_empty());
    assert_eq!(session.conversation().len(), 2);
}

#[tokio::test]
async fn question_before_upload_is_rejected() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, _store, _dir) = service(backend.clone(), &settings());
    let mut session = RagSession::new("s1");

    assert_eq!(session.loaded_rows(), None);
    let outcome = rag.submit(&mut session, "Where is B from?").await.unwrap();
    assert_eq!(outcome, Outcome::Warned(RAG_NOT_READY_WARNING.to_owned()));
    assert!(session.conversation().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn blank_question_is_rejected_after_upload() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, _store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();

    let outcome = rag.submit(&mut session, "   ").await.unwrap();
    assert!(matches!(outcome, Outcome::Warned(_)));
    assert!(session.conversation().is_empty());
}

#[tokio::test]
async fn distance_threshold_turns_far_match_into_no_answer() {
    let backend = ScriptedBackend::replying(&["unused"]);
    let settings = Settings { max_distance: Some(0.5), ..settings() };
    let (rag, _store, _dir) = service(backend.clone(), &settings);
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();

    // "B" alone is distance 1.0 from "B CA"
    let outcome = rag.submit(&mut session, "Where is B from?").await.unwrap();
    assert_eq!(outcome.reply(), Some(NO_ANSWER_MESSAGE));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn unrelated_question_still_gets_nearest_row_without_threshold() {
    let backend = ScriptedBackend::replying(&["no idea"]);
    let (rag, _store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();

    let context = rag.retrieve(session.collection().unwrap(), "What is the weather?").await.unwrap();
    assert!(context.is_some());
}

#[tokio::test]
async fn completion_failure_inline_keeps_store_unchanged() {
    let backend = ScriptedBackend::failing();
    let (rag, _store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();

    let outcome = rag.submit(&mut session, "Where is B from?").await.unwrap();
    assert!(matches!(outcome, Outcome::Failed(_)));
    assert!(session.conversation().is_empty());
}

#[tokio::test]
async fn completion_failure_propagates_when_configured() {
    let backend = ScriptedBackend::failing();
    let settings = Settings { failure: FailurePolicy::Propagate, ..settings() };
    let (rag, _store, _dir) = service(backend, &settings);
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();

    let err = rag.submit(&mut session, "Where is B from?").await.unwrap_err();
    assert!(err.is_completion_failure());
    assert!(session.conversation().is_empty());
}

#[tokio::test]
async fn malformed_upload_keeps_previous_collection() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();

    let err = rag.ingest_csv(&mut session, b"a,b\n1,2,3\n").await.unwrap_err();
    assert!(matches!(err, ServiceError::Csv(_)));
    assert!(err.is_bad_upload());
    assert_eq!(store.texts(session.collection().unwrap()).unwrap().len(), 3);
}

#[tokio::test]
async fn sessions_do_not_share_collections() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, store, _dir) = service(backend, &settings());
    let mut first = RagSession::new("1b4e28ba-2fa1-11d2-883f-0016d3cca427");
    let mut second = RagSession::new("6fa459ea-ee8a-3ca4-894e-db77e160355e");

    rag.ingest_csv(&mut first, COUNTRIES_CSV).await.unwrap();
    rag.ingest_csv(&mut second, b"code\nUK\n").await.unwrap();

    assert_ne!(first.collection(), second.collection());
    assert_eq!(store.texts(first.collection().unwrap()).unwrap().len(), 3);
    assert_eq!(store.texts(second.collection().unwrap()).unwrap().len(), 1);
}

#[tokio::test]
async fn ending_session_drops_its_collection() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, store, _dir) = service(backend, &settings());
    let mut session = RagSession::new("s1");
    rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap();
    let collection = session.collection().unwrap().to_owned();

    rag.end_session(session).await.unwrap();
    assert!(store.info(&collection).unwrap().is_none());
}

#[tokio::test]
async fn released_session_leaves_recreated_session_rows_alone() {
    let backend = ScriptedBackend::replying(&[]);
    let (rag, store, _dir) = service(backend, &settings());
    let id = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";
    let mut evicted = RagSession::new(id);
    rag.ingest_csv(&mut evicted, COUNTRIES_CSV).await.unwrap();

    let mut recreated = RagSession::new(id);
    rag.ingest_csv(&mut recreated, b"code\nUK\n").await.unwrap();
    assert_ne!(evicted.collection(), recreated.collection());

    rag.end_session(evicted).await.unwrap();
    assert_eq!(store.texts(recreated.collection().unwrap()).unwrap(), vec!["UK"]);
}

/// Reports one dimension more than it produces.
struct MisreportingEmbedder;

impl Embedder for MisreportingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        KeywordEmbedder.embed(text)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        KeywordEmbedder.embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        KeywordEmbedder.dimension() + 1
    }
}

#[tokio::test]
async fn embeddings_of_unexpected_dimension_are_rejected() {
    let (store, _dir) = temp_store();
    let rag = RagService::new(
        ScriptedBackend::replying(&[]),
        Arc::new(MisreportingEmbedder),
        store.clone(),
        &settings(),
    );
    let mut session = RagSession::new("s1");

    let err = rag.ingest_csv(&mut session, COUNTRIES_CSV).await.unwrap_err();
    assert!(matches!(err, ServiceError::Ingest(_)));
    assert!(!session.has_data());
    assert!(store.collection_names().unwrap().is_empty());
}
