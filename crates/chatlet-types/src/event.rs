//! Conversation store mutation events.
//!
//! Every store mutation publishes one event on the conversation bus in the
//! same call, with no buffering. The persistence gateway and any rendering
//! layer subscribe to these.

use serde::{Deserialize, Serialize};

/// A mutation of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A turn was appended; `len` is the new log length.
    Appended { len: usize },

    /// The content of the final turn was replaced.
    ReplacedLast,

    /// The whole log was replaced with a fresh welcome turn. Durable state
    /// must be cleared.
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde() {
        let ev = ConversationEvent::Appended { len: 3 };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"type":"appended","len":3}"#);
        let parsed: ConversationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ev);
    }

    #[test]
    fn test_reset_tag() {
        let json = serde_json::to_string(&ConversationEvent::Reset).unwrap();
        assert_eq!(json, r#"{"type":"reset"}"#);
    }
}
