//! The in-memory conversation log.
//!
//! `ConversationStore` owns the ordered sequence of turns rendered by the
//! UI and sent to the completion endpoint. It is append-only except for
//! replacement of the final turn (the assistant placeholder pattern) and
//! the atomic `reset`. Every mutation publishes one [`ConversationEvent`]
//! synchronously on the bus.

use chatlet_types::event::ConversationEvent;
use chatlet_types::turn::Turn;
use tokio::sync::broadcast;
use tracing::warn;

use super::bus::ConversationBus;

/// Default broadcast capacity; a handful of subscribers (gateway, renderer)
/// and short bursts of mutations.
const EVENT_CAPACITY: usize = 64;

/// Ordered log of conversation turns, the single source of truth for the
/// rendered conversation.
///
/// Mutated exclusively by the request controller (append user + placeholder,
/// replace-last) and by an explicit `reset`.
pub struct ConversationStore {
    turns: Vec<Turn>,
    welcome: String,
    bus: ConversationBus,
}

impl ConversationStore {
    /// Build the log from a persisted snapshot, or seed it with a single
    /// assistant welcome turn when no usable snapshot exists.
    ///
    /// The persistence gateway already treats malformed stored values as
    /// absent, so this never fails.
    pub fn restore(persisted: Option<Vec<Turn>>, welcome: impl Into<String>) -> Self {
        let welcome = welcome.into();
        let turns = persisted.unwrap_or_else(|| vec![Turn::assistant(welcome.clone())]);
        Self {
            turns,
            welcome,
            bus: ConversationBus::new(EVENT_CAPACITY),
        }
    }

    /// Append one turn. Returns the new log length.
    pub fn append(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        let len = self.turns.len();
        self.bus.publish(ConversationEvent::Appended { len });
        len
    }

    /// Overwrite the content of the final turn.
    ///
    /// The log always ends with an assistant placeholder while a send is
    /// pending, so an empty log here is an inconsistency: it is reported
    /// and the call becomes a no-op.
    pub fn replace_last(&mut self, content: impl Into<String>) {
        match self.turns.last_mut() {
            Some(last) => {
                last.content = content.into();
                self.bus.publish(ConversationEvent::ReplacedLast);
            }
            None => {
                warn!("replace_last called on an empty conversation log");
            }
        }
    }

    /// Atomically replace the whole log with a single fresh welcome turn.
    ///
    /// Publishes [`ConversationEvent::Reset`], which the persistence
    /// gateway interprets as "clear durable state".
    pub fn reset(&mut self) {
        self.turns = vec![Turn::assistant(self.welcome.clone())];
        self.bus.publish(ConversationEvent::Reset);
    }

    /// The current turn sequence.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Owned copy of the current turn sequence.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Number of turns in the log.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log is empty (only possible via a persisted empty array).
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Subscribe to mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.bus.subscribe()
    }
}
