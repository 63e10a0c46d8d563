use std::path::Path;

use anyhow::{Context as _, Result};
use ragchat_service::{Outcome, RagService, RagSession, ServiceError};

use crate::Components;

pub(crate) async fn run(components: &Components, csv: &Path, question: &str) -> Result<()> {
    let data = tokio::fs::read(csv).await.with_context(|| format!("reading {}", csv.display()))?;

    let rag = components.rag_service()?;
    match answer_from_csv(&rag, &data, question).await? {
        Outcome::Answered(reply) => println!("{reply}"),
        Outcome::Warned(msg) => anyhow::bail!(msg),
        Outcome::Failed(msg) => anyhow::bail!(msg),
        Outcome::Ignored => {},
    }
    Ok(())
}

/// Ingests `data` into a throwaway session and asks `question` against it.
/// The session's collection is dropped whether or not the question succeeds.
async fn answer_from_csv(
    rag: &RagService,
    data: &[u8],
    question: &str,
) -> Result<Outcome, ServiceError> {
    let mut session = RagSession::new("cli");
    let report = rag.ingest_csv(&mut session, data).await?;
    tracing::info!(rows = report.rows, collection = %report.collection, "file ingested");

    let submitted = rag.submit(&mut session, question).await;
    rag.end_session(session).await?;
    submitted
}
