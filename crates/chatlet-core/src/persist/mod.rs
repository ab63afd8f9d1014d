//! Durable persistence: the state-store port and the debounced gateway.

pub mod gateway;
pub mod state;

pub use gateway::PersistenceGateway;
pub use state::{SESSION_KEY, StateStore, TRANSCRIPT_KEY, load_transcript};
