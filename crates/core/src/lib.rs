//! Core types for ragchat
//!
//! Conversation turns, ingested rows, behaviour policies, settings and
//! credentials shared by every other crate.

mod constants;
mod conversation;
mod credentials;
mod document;
mod env_config;
mod error;
mod policy;
mod settings;
mod turn;

pub use constants::*;
pub use conversation::Conversation;
pub use credentials::{API_KEY_VAR, BASE_URL_VAR, Credentials};
pub use document::{DocumentRow, row_text};
pub use env_config::{env_parse_optional, env_parse_with_default};
pub use error::{CoreError, Result};
pub use policy::{EmptyInputPolicy, FailurePolicy, non_blank};
pub use settings::Settings;
pub use turn::{Role, Turn};
