//! # chatline_core
//!
//! Core chat storage logic for chatline: two-party chats, their messages,
//! and the schema they live in.

pub mod chats;
pub mod migrate;
pub mod models;

pub use chats::{ChatError, ChatPair, ChatTarget};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
