//! # chatline_api
//!
//! Chat message gateway for chatline: list a user's chats, read a chat's
//! history, and send a message (creating the two-party chat on first use).
//! The gateway takes a [`request::RequestDescriptor`] and returns a
//! [`response::ResponseDescriptor`]; [`router`] mounts it behind axum.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod request;
pub mod response;

use axum::Router;
use axum::routing::any;
use tower_http::trace::TraceLayer;

use crate::gateway::Gateway;
use crate::handlers::gateway::gateway_handler;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The gateway and its connection pool.
    pub gateway: Gateway,
}

/// Run embedded database migrations.
///
/// Delegates to `chatline_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(state: &AppState) -> Result<(), chatline_core::ChatError> {
    chatline_core::migrate::migrate(state.gateway.pool()).await
}

/// Builds the Axum router: every method on `/` goes to the gateway.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(gateway_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
