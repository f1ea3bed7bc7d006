//! Storage rows.
//!
//! These are internal row shapes, distinct from the camelCase response
//! bodies the API layer serializes.

pub mod chat;

pub use chat::{ChatSummaryRow, MessageRow, SentMessage};
