//! Message create / read services.
//!
//! These functions hold the only decision logic of the service: validation
//! on the way in, and the pagination policy on the way out. They are generic
//! over [`MessageStore`] so they can be driven by a fake store in tests.

use tracing::info;

use crate::entities::{MessageRecord, MessageStore, NewMessage};
use crate::error::{MessageError, StoreOperation};
use crate::schemas::{CreateMessageRequest, PageQuery};
use crate::validation::validate_request;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// A checked `limit` / `offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Apply defaults and range checks. `limit` must lie in `1..=100`,
    /// `offset` must not be negative.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, MessageError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        let offset = offset.unwrap_or(0);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(MessageError::invalid_parameter(
                "limit",
                format!("must be between 1 and {MAX_LIMIT}, got {limit}"),
            ));
        }
        if offset < 0 {
            return Err(MessageError::invalid_parameter(
                "offset",
                format!("must be greater than or equal to 0, got {offset}"),
            ));
        }
        Ok(Self { limit, offset })
    }
}

impl TryFrom<&PageQuery> for Pagination {
    type Error = MessageError;

    fn try_from(q: &PageQuery) -> Result<Self, Self::Error> {
        Pagination::new(q.limit, q.offset)
    }
}

/// One page of a room together with the room's full count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub items: Vec<MessageRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Validate `req` and append it to the store.
pub async fn create_message<S: MessageStore>(
    store: &S,
    req: CreateMessageRequest,
) -> Result<MessageRecord, MessageError> {
    validate_request(&req)?;
    let new: NewMessage = req.into();
    let room_id = new.room_id.clone();

    let stored = store
        .create_message(new)
        .await
        .map_err(|e| MessageError::storage(StoreOperation::CreateMessage, &room_id, e))?;

    info!(message_id = stored.id, room_id = %stored.room_id, "message created");
    Ok(stored)
}

/// Read one page of `room_id`.
///
/// A room that has never had a message is [`MessageError::RoomNotFound`] when
/// the first page is requested. Any later offset on such a room, and any
/// offset past the end of a non-empty room, is a normal empty page.
pub async fn list_room_messages<S: MessageStore>(
    store: &S,
    room_id: &str,
    page: Pagination,
) -> Result<MessagePage, MessageError> {
    let total = store
        .count_messages(room_id)
        .await
        .map_err(|e| MessageError::storage(StoreOperation::CountMessages, room_id, e))?;

    if total == 0 && page.offset == 0 {
        info!(room_id = %room_id, "room has no messages");
        return Err(MessageError::RoomNotFound(room_id.to_owned()));
    }

    let items = store
        .page_messages(room_id, page.limit, page.offset)
        .await
        .map_err(|e| MessageError::storage(StoreOperation::PageMessages, room_id, e))?;

    info!(room_id = %room_id, count = items.len(), total, "retrieved room messages");
    Ok(MessagePage {
        items,
        total,
        limit: page.limit,
        offset: page.offset,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
