//! Debounced durable writer for the conversation log.
//!
//! The gateway subscribes to the conversation bus. Each mutation
//! (re)schedules one deferred flush after a fixed debounce delay,
//! superseding any pending timer -- there is a single pending-timer handle,
//! replaced on every mutation, never multiple concurrent writers. A `Reset`
//! event drops any pending flush and removes the durable transcript key.
//!
//! On flush the log is truncated to its last `history_limit` turns and
//! written as one serialized value. Write failures are logged, never fatal.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chatlet_types::event::ConversationEvent;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Sleep, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::conversation::ConversationStore;

use super::state::{StateStore, TRANSCRIPT_KEY};

/// Observes conversation mutations and persists the log with debouncing
/// and bounded retention.
pub struct PersistenceGateway<S: StateStore> {
    state: Arc<S>,
    store: Arc<Mutex<ConversationStore>>,
    debounce: Duration,
    history_limit: usize,
    shutdown: CancellationToken,
}

impl<S: StateStore + 'static> PersistenceGateway<S> {
    pub fn new(
        state: Arc<S>,
        store: Arc<Mutex<ConversationStore>>,
        debounce: Duration,
        history_limit: usize,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            state,
            store,
            debounce,
            history_limit,
            shutdown,
        }
    }

    /// Spawn the gateway task on the current runtime.
    ///
    /// The task runs until the shutdown token is cancelled or the event
    /// channel closes, flushing any still-pending write before exiting.
    /// (The gateway itself keeps the store -- and thus the bus sender --
    /// alive, so process shutdown goes through the token.)
    pub fn spawn(self, events: broadcast::Receiver<ConversationEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }

    async fn run(self, mut events: broadcast::Receiver<ConversationEvent>) {
        // The one pending-timer handle; replaced, never duplicated.
        let mut pending: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    if pending.is_some() {
                        self.flush().await;
                    }
                    break;
                }
                event = events.recv() => match event {
                    Ok(ConversationEvent::Reset) => {
                        pending = None;
                        if let Err(err) = self.state.remove(TRANSCRIPT_KEY).await {
                            warn!(%err, "could not clear persisted transcript");
                        }
                    }
                    Ok(_) => {
                        pending = Some(Box::pin(sleep(self.debounce)));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "conversation events lagged, scheduling flush");
                        pending = Some(Box::pin(sleep(self.debounce)));
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        if pending.is_some() {
                            self.flush().await;
                        }
                        break;
                    }
                },
                () = wait_for(&mut pending), if pending.is_some() => {
                    pending = None;
                    self.flush().await;
                }
            }
        }
    }

    /// Write the last `history_limit` turns as a single serialized value.
    async fn flush(&self) {
        let snapshot = {
            let store = self.store.lock().await;
            let turns = store.turns();
            let start = turns.len().saturating_sub(self.history_limit);
            turns[start..].to_vec()
        };

        let serialized = match serde_json::to_string(&snapshot) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(%err, "could not serialize transcript");
                return;
            }
        };

        match self.state.set(TRANSCRIPT_KEY, &serialized).await {
            Ok(()) => debug!(turns = snapshot.len(), "transcript flushed"),
            Err(err) => warn!(%err, "could not persist transcript"),
        }
    }
}

/// Await the pending timer. Guarded by `if pending.is_some()` in the
/// select arm; parks forever otherwise so no arm fires spuriously.
async fn wait_for(pending: &mut Option<Pin<Box<Sleep>>>) {
    match pending.as_mut() {
        Some(timer) => timer.await,
        None => std::future::pending().await,
    }
}
