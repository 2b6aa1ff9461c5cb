use crate::entities::dao::{MessageRecord, NewMessage};
use crate::entities::{AnyStore, decode_timestamp};
use std::future::Future;

type MessageRow = (i64, String, String, String, String);

/// Append-only, room-scoped message persistence.
pub trait MessageStore: Send + Sync + 'static {
    /// Persist `msg`, assigning `id` and `created_at`, and return the stored
    /// row. The insert is a single statement, so readers never observe a
    /// partially written message, and both values are taken inside it so
    /// their orders agree.
    fn create_message(
        &self,
        msg: NewMessage,
    ) -> impl Future<Output = Result<MessageRecord, sqlx::Error>> + Send;

    /// Total number of messages ever stored for `room_id`.
    fn count_messages(
        &self,
        room_id: &str,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Up to `limit` messages of `room_id`, oldest first (ties by `id`),
    /// skipping the first `offset`. Past the end this is an empty `Vec`.
    fn page_messages(
        &self,
        room_id: &str,
        limit: i64,
        offset: i64,
    ) -> impl Future<Output = Result<Vec<MessageRecord>, sqlx::Error>> + Send;
}

impl MessageStore for AnyStore {
    async fn create_message(&self, msg: NewMessage) -> Result<MessageRecord, sqlx::Error> {
        // SQLite serialises writers, so the clock read here follows id order.
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO messages (room_id, sender, content, created_at) \
             VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')) \
             RETURNING id, room_id, sender, content, created_at",
        )
        .bind(&msg.room_id)
        .bind(&msg.sender)
        .bind(&msg.content)
        .fetch_one(&self.pool)
        .await?;
        into_record(row)
    }

    async fn count_messages(&self, room_id: &str) -> Result<i64, sqlx::Error> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE room_id = ?1")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    async fn page_messages(
        &self,
        room_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageRecord>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, room_id, sender, content, created_at \
             FROM messages WHERE room_id = ?1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT ?2 OFFSET ?3",
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(into_record).collect()
    }
}

fn into_record(
    (id, room_id, sender, content, created_at): MessageRow,
) -> Result<MessageRecord, sqlx::Error> {
    Ok(MessageRecord {
        id,
        room_id,
        sender,
        content,
        created_at: decode_timestamp(&created_at)?,
    })
}
