//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** storage errors are logged with full detail but only a
//! generic message is returned to the caller so that SQL or driver details
//! never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatlog_core::{FieldViolation, MessageError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the chatlog-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The create payload was rejected; one entry per offending field.
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    /// A query parameter was malformed or out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body could not be read at all (too large, broken stream).
    #[error("unreadable body: {message}")]
    UnreadableBody { status: StatusCode, message: String },

    /// Propagated from the message store, with operation and room context.
    #[error(transparent)]
    Storage(MessageError),
}

impl From<MessageError> for ServerError {
    fn from(e: MessageError) -> Self {
        match e {
            MessageError::Validation(fields) => ServerError::Validation(fields),
            e @ MessageError::InvalidParameter { .. } => ServerError::InvalidParameter(e.to_string()),
            e @ MessageError::RoomNotFound(_) => ServerError::NotFound(e.to_string()),
            e @ MessageError::Storage { .. } => ServerError::Storage(e),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::Validation(fields) => {
                let body = json!({ "error": "validation failed", "fields": fields });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
            // Client-facing errors: expose the message directly.
            ServerError::InvalidParameter(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::UnreadableBody { status, message } => (*status, message.clone()),

            // Internal errors: log the full detail, return a generic message.
            ServerError::Storage(e) => {
                if let MessageError::Storage { operation, room_id, source } = e {
                    error!(%operation, %room_id, error = %source, "storage error");
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
