use crate::entities::MessageRecord;
use crate::entities::encode_timestamp;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for `POST /api/v1/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateMessageRequest {
    /// Conversation scope, 1 to 100 characters.
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub room_id: String,
    /// Author, 1 to 100 characters.
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub sender: String,
    /// Message body, up to 5000 characters. Empty is allowed.
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub content: String,
}

/// A stored message as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub room_id: String,
    pub sender: String,
    pub content: String,
    /// RFC 3339 UTC timestamp assigned by the store.
    pub created_at: String,
}

/// Query string of `GET /api/v1/rooms/{room_id}/messages`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Maximum number of messages to return, 1 to 100 (default 20).
    pub limit: Option<i64>,
    /// Number of messages to skip, at least 0 (default 0).
    pub offset: Option<i64>,
}

/// One page of a room's history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedMessages {
    pub items: Vec<MessageResponse>,
    /// Every message ever stored for the room, independent of the window.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl MessageRecord {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id,
            room_id: self.room_id.clone(),
            sender: self.sender.clone(),
            content: self.content.clone(),
            created_at: encode_timestamp(&self.created_at),
        }
    }
}
