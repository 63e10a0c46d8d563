use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use ragchat_core::non_blank;

use super::{read_upload, track_phase};
use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::{ChatRequest, RagAskRequest, SessionQuery};
use crate::registry::session_cookie;
use crate::response_types::{ExchangeResponse, SessionStatusResponse, UploadResponse};

/// Explicit id first, then the cookie.
fn requested_session(explicit: Option<String>, headers: &HeaderMap) -> Option<String> {
    explicit.or_else(|| session_cookie(headers))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let requested = requested_session(req.session_id, &headers);
    let checkout = state.checkout(requested.as_deref()).await;
    let mut session = checkout.state.lock().await;
    let reaches_model = non_blank(&req.message).is_some();
    let outcome = track_phase(
        &checkout.phase,
        reaches_model,
        state.chat.submit(&mut session.conversation, &req.message),
    )
    .await?;
    Ok(Json(ExchangeResponse {
        session_id: checkout.id.clone(),
        phase: outcome.phase(),
        history: session.conversation.history().to_vec(),
        outcome,
    }))
}

pub async fn rag_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let requested = requested_session(query.session_id, &headers);
    let checkout = state.checkout(requested.as_deref()).await;
    let Some(data) = read_upload(&mut multipart).await? else {
        return Err(ApiError::BadRequest("missing or empty `file` field".to_owned()));
    };
    let mut session = checkout.state.lock().await;
    let report = state.rag.ingest_csv(&mut session.rag, &data).await?;
    Ok(Json(UploadResponse { session_id: checkout.id.clone(), report }))
}

pub async fn rag_ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RagAskRequest>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let requested = requested_session(req.session_id, &headers);
    let checkout = state.checkout(requested.as_deref()).await;
    let mut session = checkout.state.lock().await;
    let reaches_model = session.rag.has_data() && non_blank(&req.question).is_some();
    let outcome = track_phase(
        &checkout.phase,
        reaches_model,
        state.rag.submit(&mut session.rag, &req.question),
    )
    .await?;
    Ok(Json(ExchangeResponse {
        session_id: checkout.id.clone(),
        phase: outcome.phase(),
        history: session.rag.conversation().history().to_vec(),
        outcome,
    }))
}

/// Phase of the session's current or latest action. Does not wait for an
/// in-flight submission.
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> Json<SessionStatusResponse> {
    let requested = requested_session(query.session_id, &headers);
    let checkout = state.checkout(requested.as_deref()).await;
    Json(SessionStatusResponse { session_id: checkout.id.clone(), phase: checkout.phase.get() })
}
