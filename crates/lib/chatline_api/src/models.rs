//! JSON response bodies.

use chatline_core::models::{ChatSummaryRow, MessageRow, SentMessage};
use serde::Serialize;

/// Body of `GET ?action=list`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub chat_id: i64,
    pub other_user_id: i64,
    pub other_user_name: String,
    pub other_user_image: Option<String>,
    pub last_message: Option<String>,
    pub last_message_time: Option<String>,
}

impl From<ChatSummaryRow> for ChatSummary {
    fn from(row: ChatSummaryRow) -> Self {
        Self {
            chat_id: row.chat_id,
            other_user_id: row.other_user_id,
            other_user_name: row.other_user_name,
            other_user_image: row.other_user_image,
            last_message: row.last_message,
            last_message_time: row.last_message_time.map(|t| t.to_rfc3339()),
        }
    }
}

/// Body of `GET ?action=messages`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageItem {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    pub created_at: String,
}

impl From<MessageRow> for MessageItem {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            content: row.content,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Body of a successful `POST {action: "send"}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message_id: i64,
    pub chat_id: i64,
    pub created_at: String,
}

impl From<SentMessage> for SendMessageResponse {
    fn from(sent: SentMessage) -> Self {
        Self {
            success: true,
            message_id: sent.message_id,
            chat_id: sent.chat_id,
            created_at: sent.created_at.to_rfc3339(),
        }
    }
}

/// Error body. `message` is only present for field-level rejections.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
