//! Response types (Serialize)

use ragchat_core::Turn;
use ragchat_service::{IngestReport, Outcome, Phase};
use serde::Serialize;

/// Result of one JSON exchange, with the session's history afterwards.
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub session_id: String,
    pub phase: Phase,
    pub outcome: Outcome,
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub report: IngestReport,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub phase: Phase,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
