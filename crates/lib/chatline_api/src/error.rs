//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatline_core::ChatError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;
use crate::response::ResponseDescriptor;

/// Body text for every rejected request.
pub const INVALID_REQUEST: &str = "Invalid request";

/// Convenience alias for gateway return types.
pub type AppResult<T> = Result<T, AppError>;

/// Gateway errors.
///
/// `InvalidRequest` and `Validation` are answered inline with a 400. The
/// remaining variants escape the gateway and are left to the host, which the
/// axum adapter maps to a 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request")]
    InvalidRequest,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] ChatError),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the error is the caller's fault and answered with a 400.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AppError::InvalidRequest | AppError::Validation(_))
    }

    fn status(&self) -> StatusCode {
        if self.is_rejection() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            AppError::InvalidRequest => ErrorResponse {
                error: INVALID_REQUEST.into(),
                message: None,
            },
            AppError::Validation(m) => ErrorResponse {
                error: INVALID_REQUEST.into(),
                message: Some(m.clone()),
            },
            AppError::Storage(_) | AppError::Encode(_) => ErrorResponse {
                error: "Internal server error".into(),
                message: None,
            },
        }
    }

    /// Render as a response descriptor.
    pub fn to_descriptor(&self) -> ResponseDescriptor {
        let body = self.body();
        ResponseDescriptor::json(self.status(), &body).unwrap_or_else(|_| ResponseDescriptor {
            status_code: self.status().as_u16(),
            headers: Default::default(),
            body: String::new(),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Storage(ChatError::Db(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.is_rejection() {
            error!(error = %self, "request failed");
        }
        self.to_descriptor().into_response()
    }
}
