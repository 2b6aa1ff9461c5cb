//! Error taxonomy for the message create / read contract.
//!
//! Every variant maps onto exactly one class of transport response, so the
//! HTTP layer never has to inspect error messages to choose a status code.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// The store operation that was running when a [`MessageError::Storage`]
/// was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StoreOperation {
    CreateMessage,
    CountMessages,
    PageMessages,
}

/// One rejected field of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    /// Name of the offending field, e.g. `"room_id"`.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All errors produced by the message services.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The create payload was malformed. Carries every offending field.
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldViolation>),

    /// A pagination parameter was out of range or not an integer.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The room has never had a message and the first page was requested.
    #[error("room {0} not found")]
    RoomNotFound(String),

    /// The underlying store failed.
    #[error("storage error during {operation} for room {room_id}: {source}")]
    Storage {
        operation: StoreOperation,
        room_id: String,
        #[source]
        source: sqlx::Error,
    },
}

impl MessageError {
    pub fn storage(operation: StoreOperation, room_id: &str, source: sqlx::Error) -> Self {
        MessageError::Storage {
            operation,
            room_id: room_id.to_owned(),
            source,
        }
    }

    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        MessageError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}
