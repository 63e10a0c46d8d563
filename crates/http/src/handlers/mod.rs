#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod api;
pub mod pages;

use axum::body::Bytes;
use axum::extract::Multipart;
use ragchat_service::{Outcome, Phase, ServiceError};

use crate::api_error::ApiError;
use crate::registry::PhaseCell;

/// Awaits one submission, publishing `AwaitingModel` while it runs when the
/// input will reach the model, then the phase the submission ended in.
async fn track_phase(
    phase: &PhaseCell,
    reaches_model: bool,
    submission: impl Future<Output = Result<Outcome, ServiceError>>,
) -> Result<Outcome, ServiceError> {
    if reaches_model {
        phase.set(Phase::AwaitingModel);
    }
    let result = submission.await;
    phase.set(result.as_ref().map_or(Phase::Rendered, Outcome::phase));
    result
}

/// Contents of the `file` field, or `None` when no non-empty file was sent.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let data = field.bytes().await?;
            return Ok((!data.is_empty()).then_some(data));
        }
    }
    Ok(None)
}
