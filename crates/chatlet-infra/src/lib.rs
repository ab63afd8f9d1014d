//! Infrastructure layer for Chatlet.
//!
//! Contains implementations of the ports defined in `chatlet-core`: the
//! reqwest completion client and the file-backed state store, plus the
//! `config.toml` loader.

pub mod completion;
pub mod config;
pub mod state;
