//! Conversation turn types for Chatlet.
//!
//! A `Turn` is one message in the conversation: a role plus textual content.
//! Turns serialize to the completion endpoint's wire shape
//! (`{"role": "user", "content": "..."}`) directly, so the in-memory log is
//! the literal request context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// A single message in the conversation log.
///
/// Turns are immutable once superseded; only the final turn of a
/// conversation may be replaced in place (the assistant placeholder
/// pattern used while a reply is pending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// A system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// An empty assistant turn, appended right after a user turn and
    /// replaced once the reply resolves.
    pub fn placeholder() -> Self {
        Self::assistant("")
    }

    /// Whether this turn has no content (a still-pending placeholder).
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
