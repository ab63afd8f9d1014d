//! Demo engine configuration.
//!
//! Loaded from `{data_dir}/config.toml` by `chatlet-infra`; every field has
//! a default so a missing or partial file still yields a working engine.

use serde::{Deserialize, Serialize};

/// Configuration for the chat demo engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Completion endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Assistant turn that seeds an empty conversation.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Maximum number of turns kept in durable storage. In-memory state is
    /// unbounded within a session.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Debounce delay before a durable write, in milliseconds.
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// Transport-level request timeout in seconds. `None` disables the
    /// timeout, restoring the unbounded-pending behavior of the original
    /// demo (a hung request then stays busy until superseded).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            welcome_message: default_welcome_message(),
            history_limit: default_history_limit(),
            persist_debounce_ms: default_persist_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8787/api/chat".to_string()
}

fn default_welcome_message() -> String {
    "Hi! I'm the Chatlet demo assistant. Ask me anything.".to_string()
}

fn default_history_limit() -> usize {
    200
}

fn default_persist_debounce_ms() -> u64 {
    150
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(120)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DemoConfig::default();
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.persist_debounce_ms, 150);
        assert_eq!(config.request_timeout_secs, Some(120));
        assert!(!config.welcome_message.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: DemoConfig =
            serde_json::from_str(r#"{"endpoint":"https://example.com/chat"}"#).unwrap();
        assert_eq!(config.endpoint, "https://example.com/chat");
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.persist_debounce_ms, 150);
    }

    #[test]
    fn test_timeout_can_be_disabled() {
        let config: DemoConfig =
            serde_json::from_str(r#"{"request_timeout_secs":null}"#).unwrap();
        assert_eq!(config.request_timeout_secs, None);
    }
}
