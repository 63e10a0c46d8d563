use std::sync::Arc;

use anyhow::Result;
use ragchat_http::{AppState, create_router};

use crate::Components;

pub(crate) async fn run(components: &Components, host: &str, port: u16) -> Result<()> {
    let chat = components.chat_service();
    let rag = components.rag_service()?;
    let state = Arc::new(AppState::new(chat, rag, &components.settings));

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
