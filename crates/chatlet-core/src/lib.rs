//! Session engine for the Chatlet chat demo.
//!
//! This crate defines the conversation log, the request controller (the
//! single-authoritative-request state machine), the debounced persistence
//! gateway, session identity, and scroll-follow logic, plus the "ports"
//! (provider and state-store traits) that the infrastructure layer
//! implements. It depends only on `chatlet-types` -- never on
//! `chatlet-infra` or any IO crate.

pub mod completion;
pub mod controller;
pub mod conversation;
pub mod identity;
pub mod persist;
pub mod scroll;
pub mod starter;

#[cfg(test)]
pub(crate) mod test_support;
