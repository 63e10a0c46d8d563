use std::sync::Arc;

use axum::Form;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use ragchat_core::{RAG_NOT_READY_WARNING, non_blank};

use super::{read_upload, track_phase};
use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::{AskForm, ChatForm};
use crate::registry::{session_cookie, set_session_cookie};
use crate::render::{self, Notice};

fn with_cookie(id: &str, response: impl IntoResponse) -> Response {
    ([(header::SET_COOKIE, set_session_cookie(id))], response).into_response()
}

pub async fn chat_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    let session = checkout.state.lock().await;
    let html = render::chat_page(session.conversation.history(), None);
    with_cookie(&checkout.id, Html(html))
}

pub async fn chat_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    let mut session = checkout.state.lock().await;
    let reaches_model = non_blank(&form.message).is_some();
    let outcome = track_phase(
        &checkout.phase,
        reaches_model,
        state.chat.submit(&mut session.conversation, &form.message),
    )
    .await?;
    tracing::debug!(session = %checkout.id, phase = ?outcome.phase(), "chat submission handled");
    let html = render::chat_page(session.conversation.history(), Notice::from_outcome(&outcome));
    Ok(with_cookie(&checkout.id, Html(html)))
}

pub async fn chat_reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    checkout.state.lock().await.conversation = state.chat.new_conversation();
    tracing::info!(session = %checkout.id, "chat conversation reset");
    with_cookie(&checkout.id, Redirect::to("/"))
}

pub async fn rag_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    let session = checkout.state.lock().await;
    let html =
        render::rag_page(session.rag.conversation().history(), session.rag.loaded_rows(), None);
    with_cookie(&checkout.id, Html(html))
}

pub async fn rag_upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    let upload = read_upload(&mut multipart).await?;
    let mut session = checkout.state.lock().await;

    let message;
    let notice = match upload {
        None => Some(Notice::Warn(RAG_NOT_READY_WARNING)),
        Some(data) => match state.rag.ingest_csv(&mut session.rag, &data).await {
            Ok(report) => {
                message = format!("Loaded {} rows from the uploaded file.", report.rows);
                Some(Notice::Info(&message))
            },
            Err(e) if e.is_bad_upload() => {
                message = format!("Could not read the uploaded file: {e}");
                Some(Notice::Error(&message))
            },
            Err(e) => return Err(e.into()),
        },
    };

    let html =
        render::rag_page(session.rag.conversation().history(), session.rag.loaded_rows(), notice);
    Ok(with_cookie(&checkout.id, Html(html)))
}

pub async fn rag_ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Result<Response, ApiError> {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    let mut session = checkout.state.lock().await;
    let reaches_model = session.rag.has_data() && non_blank(&form.question).is_some();
    let outcome = track_phase(
        &checkout.phase,
        reaches_model,
        state.rag.submit(&mut session.rag, &form.question),
    )
    .await?;
    tracing::debug!(session = %checkout.id, phase = ?outcome.phase(), "rag question handled");
    let html = render::rag_page(
        session.rag.conversation().history(),
        session.rag.loaded_rows(),
        Notice::from_outcome(&outcome),
    );
    Ok(with_cookie(&checkout.id, Html(html)))
}

pub async fn rag_reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let checkout = state.checkout(session_cookie(&headers).as_deref()).await;
    state.release_rag(&checkout.state).await;
    tracing::info!(session = %checkout.id, "rag session reset");
    with_cookie(&checkout.id, Redirect::to("/rag"))
}
