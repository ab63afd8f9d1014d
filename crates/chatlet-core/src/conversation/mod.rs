//! The conversation log and its mutation event bus.

pub mod bus;
pub mod store;

pub use bus::ConversationBus;
pub use store::ConversationStore;
