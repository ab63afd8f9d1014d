//! CompletionProvider trait definition.
//!
//! The port through which the request controller reaches the remote
//! completion endpoint. Uses native async fn in traits (RPITIT, Rust 2024
//! edition). The implementation lives in `chatlet-infra`
//! (`HttpCompletionClient`).

use chatlet_types::error::CompletionError;
use chatlet_types::turn::Turn;

/// Trait for completion endpoint backends.
///
/// `complete` takes the conversation history (the literal turn sequence,
/// placeholder excluded) and resolves to the effective reply content.
/// Response-shape normalization (JSON `reply` field vs. raw text) is the
/// implementation's concern; callers only see the final string.
///
/// Streaming is an unused extension point in the consumed contract and is
/// deliberately not part of this trait.
pub trait CompletionProvider: Send + Sync {
    /// Send the history to the endpoint and return the effective reply.
    fn complete(
        &self,
        history: &[Turn],
    ) -> impl std::future::Future<Output = Result<String, CompletionError>> + Send;
}
