//! Request descriptor and its typed form.
//!
//! A descriptor is whatever the host hands the gateway: method, query
//! parameters, headers and a raw body. It is turned into a [`GatewayRequest`]
//! before anything touches the database, so malformed input is rejected with
//! a 400 instead of failing halfway through a query.

use std::collections::HashMap;

use chatline_core::chats::NewMessage;
use chatline_core::{ChatPair, ChatTarget};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// User id assumed by a chat listing that names no user.
pub const DEFAULT_USER_ID: i64 = 1;

/// Header consulted when a listing has no `userId` parameter.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Invocation record handed to the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// HTTP method; `GET` when absent.
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// Raw JSON text of a `POST` body.
    #[serde(default)]
    pub body: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: &str) -> Self {
        Self {
            http_method: Some(method.to_string()),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    fn method(&self) -> String {
        self.http_method
            .as_deref()
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    fn query(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|q| q.get(key))
            .map(String::as_str)
    }

    /// Case-insensitive header lookup.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|h| {
            h.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }
}

/// The operations the gateway knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    /// CORS preflight.
    Preflight,
    ListChats { user_id: i64 },
    /// `None` when the caller sent no chat id; answered with an empty list.
    ListMessages { chat_id: Option<i64> },
    SendMessage(NewMessage),
    /// Unrecognized method/action combination.
    Invalid,
}

impl GatewayRequest {
    /// Classify and validate a descriptor.
    ///
    /// Unknown method/action combinations become [`GatewayRequest::Invalid`];
    /// a known action with bad fields is an [`AppError::Validation`].
    pub fn parse(req: &RequestDescriptor) -> AppResult<Self> {
        match req.method().as_str() {
            "OPTIONS" => Ok(GatewayRequest::Preflight),
            "GET" => parse_get(req),
            "POST" => parse_post(req),
            _ => Ok(GatewayRequest::Invalid),
        }
    }
}

fn parse_get(req: &RequestDescriptor) -> AppResult<GatewayRequest> {
    match req.query("action").unwrap_or("list") {
        "list" => {
            let user_id = match req.query("userId").or_else(|| req.header(USER_ID_HEADER)) {
                Some(raw) => parse_id("userId", raw)?,
                None => DEFAULT_USER_ID,
            };
            Ok(GatewayRequest::ListChats { user_id })
        }
        "messages" => {
            let chat_id = match req.query("chatId").map(str::trim) {
                Some(raw) if !raw.is_empty() => Some(parse_id("chatId", raw)?),
                _ => None,
            };
            Ok(GatewayRequest::ListMessages { chat_id })
        }
        _ => Ok(GatewayRequest::Invalid),
    }
}

fn parse_post(req: &RequestDescriptor) -> AppResult<GatewayRequest> {
    let raw = req.body.as_deref().filter(|b| !b.trim().is_empty()).unwrap_or("{}");
    let value: Value = serde_json::from_str(raw)
        .map_err(|_| AppError::Validation("request body is not valid JSON".into()))?;

    if value.get("action").and_then(Value::as_str) != Some("send") {
        return Ok(GatewayRequest::Invalid);
    }

    let body: SendBody = serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("malformed send body: {e}")))?;
    body.into_message().map(GatewayRequest::SendMessage)
}

/// Id given either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IdField {
    Number(i64),
    Text(String),
}

impl IdField {
    fn resolve(&self, field: &str) -> AppResult<i64> {
        match self {
            IdField::Number(n) => Ok(*n),
            IdField::Text(s) => parse_id(field, s),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendBody {
    chat_id: Option<IdField>,
    sender_id: Option<IdField>,
    content: Option<String>,
    #[serde(rename = "user1Id")]
    user1_id: Option<IdField>,
    #[serde(rename = "user2Id")]
    user2_id: Option<IdField>,
}

impl SendBody {
    fn into_message(self) -> AppResult<NewMessage> {
        let sender_id = required(self.sender_id.as_ref(), "senderId")?;
        let content = self
            .content
            .ok_or_else(|| AppError::Validation("content is required".into()))?;

        // Ids start at 1, so a zero or blank chat id is treated like an absent one.
        let chat_id = match &self.chat_id {
            Some(IdField::Text(s)) if s.trim().is_empty() => None,
            Some(id) => Some(id.resolve("chatId")?).filter(|id| *id != 0),
            None => None,
        };

        let target = match chat_id {
            Some(id) => ChatTarget::Existing(id),
            None => {
                let user1 = required(self.user1_id.as_ref(), "user1Id")?;
                let user2 = required(self.user2_id.as_ref(), "user2Id")?;
                let pair = ChatPair::new(user1, user2).ok_or_else(|| {
                    AppError::Validation("user1Id and user2Id must differ".into())
                })?;
                ChatTarget::Pair(pair)
            }
        };

        Ok(NewMessage {
            target,
            sender_id,
            content,
        })
    }
}

fn required(field: Option<&IdField>, name: &str) -> AppResult<i64> {
    field
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))?
        .resolve(name)
}

fn parse_id(field: &str, raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("{field} must be an integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(req: RequestDescriptor) -> GatewayRequest {
        GatewayRequest::parse(&req).expect("valid request")
    }

    fn rejection(req: RequestDescriptor) -> String {
        match GatewayRequest::parse(&req) {
            Err(AppError::Validation(m)) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn options_is_preflight_in_any_case() {
        assert_eq!(parse(RequestDescriptor::new("OPTIONS")), GatewayRequest::Preflight);
        assert_eq!(parse(RequestDescriptor::new("options")), GatewayRequest::Preflight);
    }

    #[test]
    fn missing_method_and_action_lists_default_user() {
        assert_eq!(
            parse(RequestDescriptor::default()),
            GatewayRequest::ListChats { user_id: 1 }
        );
    }

    #[test]
    fn list_reads_user_id_param() {
        let req = RequestDescriptor::new("GET")
            .with_query("action", "list")
            .with_query("userId", "42");
        assert_eq!(parse(req), GatewayRequest::ListChats { user_id: 42 });
    }

    #[test]
    fn list_falls_back_to_user_header() {
        let req = RequestDescriptor::new("GET").with_header("x-user-id", "8");
        assert_eq!(parse(req), GatewayRequest::ListChats { user_id: 8 });
    }

    #[test]
    fn list_param_wins_over_header() {
        let req = RequestDescriptor::new("GET")
            .with_query("userId", "3")
            .with_header("X-User-Id", "8");
        assert_eq!(parse(req), GatewayRequest::ListChats { user_id: 3 });
    }

    #[test]
    fn list_rejects_non_numeric_user() {
        let req = RequestDescriptor::new("GET").with_query("userId", "alice");
        assert_eq!(rejection(req), "userId must be an integer");
    }

    #[test]
    fn messages_with_and_without_chat_id() {
        let req = RequestDescriptor::new("GET")
            .with_query("action", "messages")
            .with_query("chatId", "7");
        assert_eq!(parse(req), GatewayRequest::ListMessages { chat_id: Some(7) });

        let req = RequestDescriptor::new("GET").with_query("action", "messages");
        assert_eq!(parse(req), GatewayRequest::ListMessages { chat_id: None });

        let req = RequestDescriptor::new("GET")
            .with_query("action", "messages")
            .with_query("chatId", "");
        assert_eq!(parse(req), GatewayRequest::ListMessages { chat_id: None });
    }

    #[test]
    fn messages_rejects_non_numeric_chat() {
        let req = RequestDescriptor::new("GET")
            .with_query("action", "messages")
            .with_query("chatId", "seven");
        assert_eq!(rejection(req), "chatId must be an integer");
    }

    #[test]
    fn unknown_get_action_is_invalid() {
        let req = RequestDescriptor::new("GET").with_query("action", "unknown");
        assert_eq!(parse(req), GatewayRequest::Invalid);
    }

    #[test]
    fn unknown_method_is_invalid() {
        assert_eq!(parse(RequestDescriptor::new("DELETE")), GatewayRequest::Invalid);
    }

    #[test]
    fn post_without_send_action_is_invalid() {
        assert_eq!(parse(RequestDescriptor::new("POST")), GatewayRequest::Invalid);
        let req = RequestDescriptor::new("POST").with_body(r#"{"action":"edit"}"#);
        assert_eq!(parse(req), GatewayRequest::Invalid);
        let req = RequestDescriptor::new("POST").with_body("[1, 2]");
        assert_eq!(parse(req), GatewayRequest::Invalid);
    }

    #[test]
    fn post_with_broken_json_is_rejected() {
        let req = RequestDescriptor::new("POST").with_body("{action: send");
        assert_eq!(rejection(req), "request body is not valid JSON");
    }

    #[test]
    fn send_into_existing_chat() {
        let req = RequestDescriptor::new("POST")
            .with_body(r#"{"action":"send","chatId":7,"senderId":3,"content":"hello"}"#);
        assert_eq!(
            parse(req),
            GatewayRequest::SendMessage(NewMessage {
                target: ChatTarget::Existing(7),
                sender_id: 3,
                content: "hello".into(),
            })
        );
    }

    #[test]
    fn send_to_new_pair_is_canonical() {
        let req = RequestDescriptor::new("POST").with_body(
            r#"{"action":"send","user1Id":9,"user2Id":"5","senderId":"5","content":"hi"}"#,
        );
        let GatewayRequest::SendMessage(msg) = parse(req) else {
            panic!("expected send");
        };
        assert_eq!(msg.target, ChatTarget::Pair(ChatPair::new(5, 9).unwrap()));
        assert_eq!(msg.sender_id, 5);
    }

    #[test]
    fn null_zero_or_blank_chat_id_means_new_pair() {
        for chat_id in ["null", "0", r#""""#, r#"" ""#] {
            let body = format!(
                r#"{{"action":"send","chatId":{chat_id},"user1Id":1,"user2Id":2,"senderId":1,"content":"x"}}"#
            );
            let GatewayRequest::SendMessage(msg) =
                parse(RequestDescriptor::new("POST").with_body(body))
            else {
                panic!("expected send");
            };
            assert!(matches!(msg.target, ChatTarget::Pair(_)));
        }
    }

    #[test]
    fn blank_chat_id_still_validates_pair_ids() {
        let req = RequestDescriptor::new("POST").with_body(
            r#"{"action":"send","chatId":"","user1Id":"a","user2Id":"b","senderId":1,"content":"x"}"#,
        );
        assert_eq!(rejection(req), "user1Id must be an integer");
    }

    #[test]
    fn send_requires_sender_and_content() {
        let req = RequestDescriptor::new("POST")
            .with_body(r#"{"action":"send","chatId":7,"content":"hello"}"#);
        assert_eq!(rejection(req), "senderId is required");

        let req = RequestDescriptor::new("POST")
            .with_body(r#"{"action":"send","chatId":7,"senderId":3}"#);
        assert_eq!(rejection(req), "content is required");
    }

    #[test]
    fn send_without_chat_requires_both_users() {
        let req = RequestDescriptor::new("POST")
            .with_body(r#"{"action":"send","user1Id":1,"senderId":1,"content":"x"}"#);
        assert_eq!(rejection(req), "user2Id is required");
    }

    #[test]
    fn send_rejects_chat_with_self() {
        let req = RequestDescriptor::new("POST").with_body(
            r#"{"action":"send","user1Id":4,"user2Id":4,"senderId":4,"content":"x"}"#,
        );
        assert_eq!(rejection(req), "user1Id and user2Id must differ");
    }

    #[test]
    fn send_rejects_non_numeric_sender() {
        let req = RequestDescriptor::new("POST")
            .with_body(r#"{"action":"send","chatId":1,"senderId":"bob","content":"x"}"#);
        assert_eq!(rejection(req), "senderId must be an integer");
    }

    #[test]
    fn descriptor_deserializes_from_event_json() {
        let req: RequestDescriptor = serde_json::from_str(
            r#"{"httpMethod":"GET","queryStringParameters":{"action":"messages","chatId":"2"}}"#,
        )
        .unwrap();
        assert_eq!(parse(req), GatewayRequest::ListMessages { chat_id: Some(2) });

        let req: RequestDescriptor =
            serde_json::from_str(r#"{"httpMethod":"GET","queryStringParameters":null}"#).unwrap();
        assert_eq!(parse(req), GatewayRequest::ListChats { user_id: 1 });
    }
}
