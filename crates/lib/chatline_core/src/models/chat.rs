//! Chat and message rows.

use chrono::{DateTime, Utc};

/// One entry of a user's chat list, seen from that user's side.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatSummaryRow {
    pub chat_id: i64,
    /// The participant that is not the requesting user.
    pub other_user_id: i64,
    pub other_user_name: String,
    pub other_user_image: Option<String>,
    /// Content of the most recent message, `None` for a chat without messages.
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
}

/// Message joined with its sender's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a committed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub created_at: DateTime<Utc>,
}
