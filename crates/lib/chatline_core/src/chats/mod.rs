//! Two-party chats and their messages.
//!
//! A chat is identified by its canonical participant pair: the lower user id
//! is always stored in `user1_id`. The storage layer enforces uniqueness of
//! the pair, which is what makes lazy chat creation safe under concurrent
//! senders.

pub mod queries;

use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::SentMessage;

/// Chat storage errors.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Canonically ordered pair of distinct participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatPair {
    low: i64,
    high: i64,
}

impl ChatPair {
    /// Orders the two ids. Returns `None` when both ids are the same user.
    pub fn new(a: i64, b: i64) -> Option<Self> {
        if a == b {
            return None;
        }
        Some(Self {
            low: a.min(b),
            high: a.max(b),
        })
    }

    /// Value stored in `chats.user1_id`.
    pub fn user1_id(&self) -> i64 {
        self.low
    }

    /// Value stored in `chats.user2_id`.
    pub fn user2_id(&self) -> i64 {
        self.high
    }
}

/// Where a new message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    /// A chat the caller already knows the id of.
    Existing(i64),
    /// The chat between two users, created on first use.
    Pair(ChatPair),
}

/// A message to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub target: ChatTarget,
    pub sender_id: i64,
    pub content: String,
}

/// Resolve the target chat and insert the message in one transaction.
///
/// Nothing is committed unless both the chat resolution and the message
/// insert succeed. Dropping the transaction on an error path rolls it back.
pub async fn send_message(
    conn: &mut PgConnection,
    message: &NewMessage,
) -> Result<SentMessage, ChatError> {
    let mut tx = conn.begin().await?;

    let chat_id = match message.target {
        ChatTarget::Existing(id) => id,
        ChatTarget::Pair(pair) => resolve_pair(&mut *tx, pair).await?,
    };

    let (message_id, created_at) =
        queries::insert_message(&mut *tx, chat_id, message.sender_id, &message.content).await?;

    tx.commit().await?;

    debug!(chat_id, message_id, sender_id = message.sender_id, "message stored");
    Ok(SentMessage {
        message_id,
        chat_id,
        created_at,
    })
}

/// Insert the chat for `pair` unless it exists, then return its id.
///
/// The insert skips on the uniqueness conflict, so a concurrent creator never
/// surfaces a constraint violation; the follow-up select sees the row it
/// committed.
async fn resolve_pair(conn: &mut PgConnection, pair: ChatPair) -> Result<i64, ChatError> {
    if let Some(id) = queries::insert_chat_if_absent(conn, pair).await? {
        info!(
            chat_id = id,
            user1_id = pair.user1_id(),
            user2_id = pair.user2_id(),
            "created chat"
        );
        return Ok(id);
    }
    Ok(queries::find_chat_id(conn, pair).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_canonical_in_either_order() {
        let a = ChatPair::new(9, 5).unwrap();
        let b = ChatPair::new(5, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.user1_id(), 5);
        assert_eq!(a.user2_id(), 9);
    }

    #[test]
    fn pair_rejects_same_user() {
        assert!(ChatPair::new(3, 3).is_none());
    }

    #[test]
    fn pair_handles_negative_ids() {
        let pair = ChatPair::new(1, -4).unwrap();
        assert_eq!(pair.user1_id(), -4);
        assert_eq!(pair.user2_id(), 1);
    }
}
