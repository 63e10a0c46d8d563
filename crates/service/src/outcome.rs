//! Result of one user action.

use serde::Serialize;

/// Where a submission ended up in `Idle → AwaitingModel → Rendered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    /// The completion call is in flight. Reported by callers that track a
    /// submission while it runs; never a final phase.
    AwaitingModel,
    Rendered,
}

/// What a submission produced. Only `Answered` changes the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// The model (or the no-answer fallback) replied; both turns were stored.
    Answered(String),
    /// Input was rejected with a warning for the user.
    Warned(String),
    /// Input was rejected silently.
    Ignored,
    /// The completion call failed; the error is shown, nothing was stored.
    Failed(String),
}

impl Outcome {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match *self {
            Self::Answered(_) | Self::Failed(_) => Phase::Rendered,
            Self::Warned(_) | Self::Ignored => Phase::Idle,
        }
    }

    #[must_use]
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Answered(reply) => Some(reply),
            _ => None,
        }
    }

    /// Message to show next to the history: warnings and errors.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Warned(msg) | Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}
