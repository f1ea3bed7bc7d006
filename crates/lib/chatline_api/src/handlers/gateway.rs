//! Axum adapter for the gateway.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};

use crate::AppState;
use crate::request::RequestDescriptor;

/// `ANY /` — translate the HTTP request into a descriptor and run it.
pub async fn gateway_handler(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let descriptor = descriptor_from_parts(&method, params, &headers, &body);
    match state.gateway.handle(&descriptor).await {
        Ok(resp) => resp.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Build a descriptor from the pieces axum extracted.
///
/// Header values that are not valid UTF-8 are skipped.
pub fn descriptor_from_parts(
    method: &Method,
    params: HashMap<String, String>,
    headers: &HeaderMap,
    body: &[u8],
) -> RequestDescriptor {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    RequestDescriptor {
        http_method: Some(method.as_str().to_string()),
        query_string_parameters: Some(params),
        headers: Some(headers),
        body: (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned()),
    }
}
