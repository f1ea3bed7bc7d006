//! Chat-related database queries.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use super::ChatPair;
use crate::models::{ChatSummaryRow, MessageRow};

/// List the chats `user_id` takes part in, most recently active first.
///
/// The other participant is picked per row by comparing `user1_id` with the
/// requesting user. Chats without messages carry `NULL` last-message columns
/// and sort after every chat that has one.
pub async fn list_chats(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<Vec<ChatSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, ChatSummaryRow>(
        r#"
        SELECT
            c.id AS chat_id,
            CASE WHEN c.user1_id = $1 THEN u2.id ELSE u1.id END AS other_user_id,
            CASE WHEN c.user1_id = $1 THEN u2.name ELSE u1.name END AS other_user_name,
            CASE WHEN c.user1_id = $1 THEN u2.image_url ELSE u1.image_url END AS other_user_image,
            m.content AS last_message,
            m.created_at AS last_message_time
        FROM chats c
        JOIN users u1 ON u1.id = c.user1_id
        JOIN users u2 ON u2.id = c.user2_id
        LEFT JOIN LATERAL (
            SELECT content, created_at
            FROM messages
            WHERE chat_id = c.id
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        ) m ON true
        WHERE c.user1_id = $1 OR c.user2_id = $1
        ORDER BY m.created_at DESC NULLS LAST, c.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Get the messages of a chat in chronological order, with sender names.
///
/// An unknown chat id yields an empty list.
pub async fn list_messages(
    conn: &mut PgConnection,
    chat_id: i64,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.sender_id, u.name AS sender_name, m.content, m.created_at
        FROM messages m
        JOIN users u ON u.id = m.sender_id
        WHERE m.chat_id = $1
        ORDER BY m.created_at ASC, m.id ASC
        "#,
    )
    .bind(chat_id)
    .fetch_all(conn)
    .await
}

/// Insert the chat row for `pair`, skipping on the pair uniqueness conflict.
///
/// Returns the new id, or `None` when the chat already existed.
pub async fn insert_chat_if_absent(
    conn: &mut PgConnection,
    pair: ChatPair,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO chats (user1_id, user2_id)
        VALUES ($1, $2)
        ON CONFLICT (user1_id, user2_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(pair.user1_id())
    .bind(pair.user2_id())
    .fetch_optional(conn)
    .await
}

/// Fetch the id of the chat for `pair`.
pub async fn find_chat_id(conn: &mut PgConnection, pair: ChatPair) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM chats WHERE user1_id = $1 AND user2_id = $2")
        .bind(pair.user1_id())
        .bind(pair.user2_id())
        .fetch_one(conn)
        .await
}

/// Insert a message, returning its generated id and server timestamp.
pub async fn insert_message(
    conn: &mut PgConnection,
    chat_id: i64,
    sender_id: i64,
    content: &str,
) -> Result<(i64, DateTime<Utc>), sqlx::Error> {
    sqlx::query_as::<_, (i64, DateTime<Utc>)>(
        r#"
        INSERT INTO messages (chat_id, sender_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, created_at
        "#,
    )
    .bind(chat_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(conn)
    .await
}
