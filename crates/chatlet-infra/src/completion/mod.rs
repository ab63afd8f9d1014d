//! Completion endpoint client.

pub mod client;

pub use client::HttpCompletionClient;
