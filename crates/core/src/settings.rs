//! Runtime tunables read from the environment.

use serde::Serialize;

use crate::constants::{DEFAULT_MODEL, DEFAULT_SESSION_IDLE_SECS, DEFAULT_SYSTEM_PROMPT};
use crate::env_config::{env_parse_optional, env_parse_with_default};
use crate::policy::{EmptyInputPolicy, FailurePolicy};

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub model: String,
    pub system_prompt: String,
    pub chat_max_tokens: Option<u32>,
    pub chat_temperature: Option<f32>,
    pub empty_input: EmptyInputPolicy,
    pub failure: FailurePolicy,
    /// Nearest rows farther than this (L2) count as "no result". `None` accepts any match.
    pub max_distance: Option<f32>,
    pub session_idle_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            chat_max_tokens: None,
            chat_temperature: None,
            empty_input: EmptyInputPolicy::default(),
            failure: FailurePolicy::default(),
            max_distance: None,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

impl Settings {
    /// Builds settings from `RAGCHAT_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: std::env::var("RAGCHAT_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            system_prompt: std::env::var("RAGCHAT_SYSTEM_PROMPT")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.system_prompt),
            chat_max_tokens: env_parse_optional("RAGCHAT_CHAT_MAX_TOKENS"),
            chat_temperature: env_parse_optional("RAGCHAT_CHAT_TEMPERATURE"),
            empty_input: env_parse_with_default("RAGCHAT_EMPTY_INPUT", defaults.empty_input),
            failure: env_parse_with_default("RAGCHAT_FAILURE_MODE", defaults.failure),
            max_distance: env_parse_optional("RAGCHAT_MAX_DISTANCE"),
            session_idle_secs: env_parse_with_default(
                "RAGCHAT_SESSION_IDLE_SECS",
                defaults.session_idle_secs,
            ),
        }
    }
}
