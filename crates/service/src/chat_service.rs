use std::sync::Arc;

use ragchat_core::{
    Conversation, EMPTY_MESSAGE_WARNING, EmptyInputPolicy, FailurePolicy, Settings, non_blank,
};
use ragchat_llm::{CompletionBackend, GenerationParams, LlmError};

use crate::ServiceError;
use crate::outcome::Outcome;

/// Plain chat orchestrator: system turn + history + new message.
pub struct ChatService {
    llm: Arc<dyn CompletionBackend>,
    params: GenerationParams,
    system_prompt: String,
    empty_input: EmptyInputPolicy,
    failure: FailurePolicy,
}

impl ChatService {
    #[must_use]
    pub fn new(llm: Arc<dyn CompletionBackend>, settings: &Settings) -> Self {
        Self {
            llm,
            params: GenerationParams::new(settings.model.clone())
                .with_max_tokens(settings.chat_max_tokens)
                .with_temperature(settings.chat_temperature),
            system_prompt: settings.system_prompt.clone(),
            empty_input: settings.empty_input,
            failure: settings.failure,
        }
    }

    /// Fresh conversation for a new session.
    #[must_use]
    pub fn new_conversation(&self) -> Conversation {
        Conversation::new(self.system_prompt.clone())
    }

    /// Handles one submitted message against the session's conversation.
    ///
    /// The conversation grows by exactly two turns when the model answers and
    /// is left untouched otherwise.
    ///
    /// # Errors
    /// Returns the completion error when the failure policy is `Propagate`.
    pub async fn submit(
        &self,
        conversation: &mut Conversation,
        input: &str,
    ) -> Result<Outcome, ServiceError> {
        if non_blank(input).is_none() {
            return Ok(reject(self.empty_input, EMPTY_MESSAGE_WARNING));
        }

        let messages = conversation.message_list(input);
        tracing::debug!(turns = messages.len(), model = %self.params.model, "awaiting chat completion");

        match self.llm.chat(&messages, &self.params).await {
            Ok(reply) => {
                conversation.record_exchange(input, reply.clone());
                Ok(Outcome::Answered(reply))
            },
            Err(e) => on_completion_failure(self.failure, e),
        }
    }
}

pub(crate) fn reject(policy: EmptyInputPolicy, warning: &str) -> Outcome {
    match policy {
        EmptyInputPolicy::Warn => Outcome::Warned(warning.to_owned()),
        EmptyInputPolicy::Ignore => Outcome::Ignored,
    }
}

pub(crate) fn on_completion_failure(
    policy: FailurePolicy,
    err: LlmError,
) -> Result<Outcome, ServiceError> {
    match policy {
        FailurePolicy::Inline => {
            tracing::warn!(error = %err, "completion failed, reporting inline");
            Ok(Outcome::Failed(format!("Error generating response: {err}")))
        },
        FailurePolicy::Propagate => Err(err.into()),
    }
}
