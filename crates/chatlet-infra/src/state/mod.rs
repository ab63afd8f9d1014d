//! Durable state storage.

pub mod file;

pub use file::FileStateStore;
