//! Broadcast bus for distributing [`ConversationEvent`] to subscribers.
//!
//! Built on `tokio::sync::broadcast`. Publishing happens synchronously in
//! the same call as the store mutation; publishing with no active
//! subscribers is a no-op.

use chatlet_types::event::ConversationEvent;
use tokio::sync::broadcast;

/// Multi-consumer bus for conversation mutation events.
///
/// Wraps a `tokio::sync::broadcast` channel. Cloning the bus clones the
/// sender, allowing multiple producers and consumers.
pub struct ConversationBus {
    sender: broadcast::Sender<ConversationEvent>,
}

impl ConversationBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: ConversationEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for ConversationBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for ConversationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
