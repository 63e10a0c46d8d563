//! Append-only conversation store scoped to one session.
//!
//! The system turn is held apart from the visible history and is prepended
//! only when a message list is built for the completion API. History grows
//! exclusively through [`Conversation::record_exchange`], which appends a user
//! turn and the assistant turn it prompted as one unit, so an assistant turn
//! can never appear without a preceding user turn.

use serde::Serialize;

use crate::constants::DEFAULT_SYSTEM_PROMPT;
use crate::turn::Turn;

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    system_prompt: String,
    history: Vec<Turn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl Conversation {
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self { system_prompt: system_prompt.into(), history: Vec::new() }
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Visible history, oldest first. Never contains the system turn.
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Messages for a chat completion: system turn, full prior history, then
    /// the pending user input. Does not modify the store.
    #[must_use]
    pub fn message_list(&self, pending_user_input: &str) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(self.history.len().saturating_add(2));
        messages.push(Turn::system(self.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(Turn::user(pending_user_input));
        messages
    }

    /// Append a completed exchange.
    pub fn record_exchange(&mut self, user_input: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Turn::user(user_input));
        self.history.push(Turn::assistant(reply));
    }
}
