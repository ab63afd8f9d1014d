//! Shared domain types for Chatlet.
//!
//! This crate contains the types used across the Chatlet demo engine:
//! conversation turns, store mutation events, configuration, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod turn;
