//! HttpCompletionClient -- concrete [`CompletionProvider`] for the demo's
//! completion endpoint.
//!
//! Sends `POST {endpoint}` with the JSON body `{"messages": [...],
//! "stream": false}` and normalizes the response: a JSON body may carry the
//! reply in a `reply` field, anything else is used as raw text. A malformed
//! response shape degrades to raw text rather than failing the send; only
//! transport failures and non-2xx statuses are errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use chatlet_core::completion::CompletionProvider;
use chatlet_types::config::DemoConfig;
use chatlet_types::error::CompletionError;
use chatlet_types::turn::Turn;

/// Correlation header carrying the opaque session identifier.
const SESSION_HEADER: &str = "x-session-id";

/// HTTP client for the completion endpoint.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    session_id: String,
}

/// Wire shape of the outbound request. `stream` is always false; streaming
/// is an unused extension point of the consumed contract.
#[derive(Serialize)]
struct CompletionPayload<'a> {
    messages: &'a [Turn],
    stream: bool,
}

/// Wire shape of a JSON success body.
#[derive(Deserialize)]
struct ReplyBody {
    reply: Option<String>,
}

impl HttpCompletionClient {
    /// Create a client for the configured endpoint.
    ///
    /// The configured transport timeout bounds an otherwise unbounded
    /// pending request; it surfaces as a normal transport failure.
    pub fn new(config: &DemoConfig, session_id: String) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().expect("failed to create reqwest client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            session_id,
        }
    }

    /// The endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Normalize a 2xx body into the effective reply content.
///
/// JSON bodies yield their `reply` field when present; a JSON body without
/// one, a body that fails to parse, and any non-JSON body are all used as
/// raw text verbatim. An absent body is the empty string (the controller
/// renders it as the ellipsis).
fn effective_content(is_json: bool, body: String) -> String {
    if !is_json {
        return body;
    }
    match serde_json::from_str::<ReplyBody>(&body) {
        Ok(ReplyBody { reply: Some(reply) }) => reply,
        Ok(ReplyBody { reply: None }) => body,
        Err(_) => body,
    }
}

impl CompletionProvider for HttpCompletionClient {
    async fn complete(&self, history: &[Turn]) -> Result<String, CompletionError> {
        let payload = CompletionPayload {
            messages: history,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(SESSION_HEADER, &self.session_id)
            .json(&payload)
            .send()
            .await
            .map_err(|err| CompletionError::Transport(format!("HTTP request failed: {err}")))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        let body = response.text().await.map_err(|err| {
            CompletionError::Transport(format!("failed to read response body: {err}"))
        })?;

        if !status.is_success() {
            return Err(CompletionError::http(status.as_u16(), &body));
        }

        Ok(effective_content(is_json, body))
    }
}
