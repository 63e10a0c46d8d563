//! Service layer for ragchat
//!
//! Orchestrates one user action at a time: validation, optional retrieval,
//! the completion call and the conversation update. Session state is passed
//! in explicitly by the caller.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Services hold trait objects")]

mod chat_service;
mod error;
mod ingest;
mod outcome;
mod prompt;
mod rag_service;

#[cfg(test)]
mod chat_service_tests;
#[cfg(test)]
mod rag_service_tests;
#[cfg(test)]
mod test_support;

pub use chat_service::ChatService;
pub use error::ServiceError;
pub use ingest::parse_row_texts;
pub use outcome::{Outcome, Phase};
pub use prompt::build_rag_prompt;
pub use rag_service::{IngestReport, RagService, RagSession};
