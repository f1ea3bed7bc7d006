//! The chat message gateway: one entry point, four operations.

use chatline_core::chats::{self, queries};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{AppError, AppResult};
use crate::models::{ChatListResponse, MessageListResponse, SendMessageResponse};
use crate::request::{GatewayRequest, RequestDescriptor};
use crate::response::ResponseDescriptor;

/// Dispatches request descriptors against the chat store.
///
/// Each database-backed request holds exactly one pooled connection for its
/// whole duration. The connection guard goes back to the pool when it drops,
/// on success and on every error path alike.
#[derive(Clone)]
pub struct Gateway {
    pool: PgPool,
}

impl Gateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a gateway with a pool sized from `config`.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Handle one invocation.
    ///
    /// Rejected requests come back as `Ok` 400 descriptors. Only storage and
    /// encoding failures are returned as `Err`.
    pub async fn handle(&self, req: &RequestDescriptor) -> AppResult<ResponseDescriptor> {
        match GatewayRequest::parse(req) {
            Ok(request) => self.execute(request).await,
            Err(e) if e.is_rejection() => {
                debug!(error = %e, "rejected request");
                Ok(e.to_descriptor())
            }
            Err(e) => Err(e),
        }
    }

    /// Run an already validated request.
    pub async fn execute(&self, request: GatewayRequest) -> AppResult<ResponseDescriptor> {
        debug!(?request, "dispatching");
        match request {
            GatewayRequest::Preflight => Ok(ResponseDescriptor::preflight()),
            GatewayRequest::Invalid => Ok(AppError::InvalidRequest.to_descriptor()),
            GatewayRequest::ListMessages { chat_id: None } => {
                Ok(ResponseDescriptor::ok(&MessageListResponse::default())?)
            }
            GatewayRequest::ListMessages {
                chat_id: Some(chat_id),
            } => {
                let mut conn = self.pool.acquire().await?;
                let rows = queries::list_messages(&mut conn, chat_id).await?;
                let body = MessageListResponse {
                    messages: rows.into_iter().map(Into::into).collect(),
                };
                Ok(ResponseDescriptor::ok(&body)?)
            }
            GatewayRequest::ListChats { user_id } => {
                let mut conn = self.pool.acquire().await?;
                let rows = queries::list_chats(&mut conn, user_id).await?;
                let body = ChatListResponse {
                    chats: rows.into_iter().map(Into::into).collect(),
                };
                Ok(ResponseDescriptor::ok(&body)?)
            }
            GatewayRequest::SendMessage(message) => {
                let mut conn = self.pool.acquire().await?;
                let sent = chats::send_message(&mut conn, &message).await?;
                Ok(ResponseDescriptor::ok(&SendMessageResponse::from(sent))?)
            }
        }
    }
}
