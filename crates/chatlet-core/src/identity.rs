//! Stable opaque session identity.
//!
//! One identifier per durable-storage origin: created lazily on first
//! access, persisted immediately, read unchanged thereafter. It has no
//! relation to the conversation other than riding on outbound requests
//! for correlation.

use std::sync::Arc;

use chatlet_types::error::StateError;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::persist::state::{SESSION_KEY, StateStore};

/// Fixed identity used for the lifetime of the process when durable
/// storage is entirely unavailable (fails closed, never throws).
pub const ANONYMOUS_SESSION: &str = "anonymous";

/// Produces and retrieves the session identifier.
pub struct SessionIdentity<S: StateStore> {
    state: Arc<S>,
    cached: Mutex<Option<String>>,
}

impl<S: StateStore> SessionIdentity<S> {
    pub fn new(state: Arc<S>) -> Self {
        Self {
            state,
            cached: Mutex::new(None),
        }
    }

    /// Return the stored identifier, creating and persisting a fresh one
    /// if none exists.
    ///
    /// The result is cached for the lifetime of this instance, so repeated
    /// calls are stable even when storage degrades after the first read.
    /// If storage is unavailable the fixed [`ANONYMOUS_SESSION`] sentinel
    /// is returned instead. If only the write fails, the generated id is
    /// still used (it will be regenerated next process).
    pub async fn get_or_create(&self) -> String {
        let mut cached = self.cached.lock().await;
        if let Some(id) = cached.as_ref() {
            return id.clone();
        }

        let id = match self.state.get(SESSION_KEY).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                let fresh = Uuid::new_v4().to_string();
                if let Err(err) = self.state.set(SESSION_KEY, &fresh).await {
                    warn!(%err, "could not persist session id");
                }
                fresh
            }
            Err(StateError::Unavailable(reason)) => {
                warn!(%reason, "session storage unavailable, using sentinel identity");
                ANONYMOUS_SESSION.to_string()
            }
            Err(err) => {
                warn!(%err, "could not read session id, using sentinel identity");
                ANONYMOUS_SESSION.to_string()
            }
        };

        *cached = Some(id.clone());
        id
    }
}
