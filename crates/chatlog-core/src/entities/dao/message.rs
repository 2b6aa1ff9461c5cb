use chrono::{DateTime, Utc};

/// A single row in the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Store-assigned, strictly increasing in insertion order.
    pub id: i64,
    pub room_id: String,
    pub sender: String,
    /// May be empty.
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A validated message that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: String,
    pub sender: String,
    pub content: String,
}
