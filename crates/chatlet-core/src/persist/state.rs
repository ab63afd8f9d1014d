//! StateStore trait definition.
//!
//! The port for durable keyed string values. The demo uses exactly two
//! independent keys: the length-capped transcript and the opaque session
//! identifier. There is no schema versioning beyond the fixed key names;
//! malformed values are treated as absent, never as fatal.
//!
//! Uses RPITIT (native async fn in traits, Rust 2024 edition).
//! Implementations live in `chatlet-infra`.

use chatlet_types::error::StateError;
use chatlet_types::turn::Turn;
use tracing::{debug, warn};

/// Durable key holding the serialized, length-capped turn sequence.
pub const TRANSCRIPT_KEY: &str = "chatlet.transcript";

/// Durable key holding the opaque session identifier.
pub const SESSION_KEY: &str = "chatlet.session";

/// Trait for durable string-keyed storage.
///
/// Concurrent writers from other processes are last-write-wins; the domain
/// is a single-user demo session, not a multi-writer system.
pub trait StateStore: Send + Sync {
    /// Get a value by key. Returns `None` if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StateError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StateError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}

/// Read the persisted transcript, if a structurally valid one exists.
///
/// Absent, unreadable, or malformed values all yield `None` so the
/// conversation store falls back to its welcome seed. Never fails.
pub async fn load_transcript<S: StateStore>(state: &S) -> Option<Vec<Turn>> {
    match state.get(TRANSCRIPT_KEY).await {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<Turn>>(&raw) {
            Ok(turns) => Some(turns),
            Err(err) => {
                debug!(%err, "persisted transcript is malformed, treating as absent");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!(%err, "could not read persisted transcript");
            None
        }
    }
}
