//! Response descriptor and the CORS envelope every response carries.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const MAX_AGE: &str = "Access-Control-Max-Age";
pub const CONTENT_TYPE: &str = "Content-Type";

const ANY_ORIGIN: &str = "*";
const PREFLIGHT_METHODS: &str = "GET, POST, OPTIONS";
const PREFLIGHT_HEADERS: &str = "Content-Type, X-User-Id";
const PREFLIGHT_MAX_AGE_SECS: &str = "86400";
const JSON: &str = "application/json";

/// What the gateway hands back to its host: status, headers and a string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescriptor {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON text, or empty for a preflight.
    pub body: String,
}

impl ResponseDescriptor {
    /// `OPTIONS` answer: CORS declarations and nothing else.
    pub fn preflight() -> Self {
        let headers = BTreeMap::from([
            (ALLOW_ORIGIN.to_string(), ANY_ORIGIN.to_string()),
            (ALLOW_METHODS.to_string(), PREFLIGHT_METHODS.to_string()),
            (ALLOW_HEADERS.to_string(), PREFLIGHT_HEADERS.to_string()),
            (MAX_AGE.to_string(), PREFLIGHT_MAX_AGE_SECS.to_string()),
        ]);
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: String::new(),
        }
    }

    /// 200 with a JSON body.
    pub fn ok<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Self::json(StatusCode::OK, payload)
    }

    /// JSON body with the CORS origin and content type set.
    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(payload)?;
        let headers = BTreeMap::from([
            (ALLOW_ORIGIN.to_string(), ANY_ORIGIN.to_string()),
            (CONTENT_TYPE.to_string(), JSON.to_string()),
        ]);
        Ok(Self {
            status_code: status.as_u16(),
            headers,
            body,
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl IntoResponse for ResponseDescriptor {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "dropping unrepresentable response header"),
            }
        }
        response
    }
}
