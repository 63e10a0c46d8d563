//! HTTP server for ragchat.
//!
//! Serves the chat page, the CSV question page and a small JSON API over the
//! same orchestrators.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod handlers;
mod query_types;
mod registry;
mod render;
mod response_types;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use ragchat_core::Settings;
use ragchat_service::{ChatService, RagService, RagSession};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use registry::{
    Checkout, PhaseCell, SESSION_COOKIE, SessionRegistry, SessionState, SharedSession,
    session_cookie,
};
pub use response_types::{
    ExchangeResponse, SessionStatusResponse, UploadResponse, VersionResponse,
};

/// Uploaded tables larger than this are rejected.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub chat: ChatService,
    pub rag: RagService,
    pub sessions: SessionRegistry,
}

impl AppState {
    #[must_use]
    pub fn new(chat: ChatService, rag: RagService, settings: &Settings) -> Self {
        Self { chat, rag, sessions: SessionRegistry::new(settings.session_idle_secs) }
    }

    /// Looks up or creates the session and releases any that went idle.
    pub async fn checkout(&self, requested: Option<&str>) -> Checkout {
        let mut checkout = self.sessions.checkout(requested, |id| SessionState {
            conversation: self.chat.new_conversation(),
            rag: RagSession::new(id),
        });
        for evicted in std::mem::take(&mut checkout.evicted) {
            self.release_rag(&evicted).await;
        }
        checkout
    }

    /// Ends the session's RAG state, dropping its collection.
    pub async fn release_rag(&self, session: &SharedSession) {
        let mut guard = session.lock().await;
        let id = guard.rag.id().to_owned();
        let previous = std::mem::replace(&mut guard.rag, RagSession::new(&id));
        if let Err(e) = self.rag.end_session(previous).await {
            tracing::warn!(session = %id, error = %e, "failed to release session collection");
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::pages::chat_page))
        .route("/chat", post(handlers::pages::chat_submit))
        .route("/chat/reset", post(handlers::pages::chat_reset))
        .route("/rag", get(handlers::pages::rag_page))
        .route("/rag/upload", post(handlers::pages::rag_upload))
        .route("/rag/ask", post(handlers::pages::rag_ask))
        .route("/rag/reset", post(handlers::pages::rag_reset))
        .route("/api/chat", post(handlers::api::chat))
        .route("/api/rag/upload", post(handlers::api::rag_upload))
        .route("/api/rag/ask", post(handlers::api::rag_ask))
        .route("/api/session", get(handlers::api::session_status))
        .route("/health", get(health))
        .route("/api/version", get(version))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
