//! Behaviour switches for the orchestrators.
//!
//! The front-ends historically disagreed on how to treat blank input and
//! completion failures. Both choices are configuration here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What to do with an empty or whitespace-only submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyInputPolicy {
    /// Reject and show a warning.
    #[default]
    Warn,
    /// Reject without feedback.
    Ignore,
}

/// What to do when the completion service fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Show the error in the page; the session continues.
    #[default]
    Inline,
    /// Return the error to the caller.
    Propagate,
}

impl EmptyInputPolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Warn => "warn",
            Self::Ignore => "ignore",
        }
    }
}

impl FailurePolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Inline => "inline",
            Self::Propagate => "propagate",
        }
    }
}

impl fmt::Display for EmptyInputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmptyInputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("invalid empty-input policy: {other}")),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!("invalid failure policy: {other}")),
        }
    }
}

/// Returns the trimmed input, or `None` when nothing but whitespace was sent.
#[must_use]
pub fn non_blank(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
