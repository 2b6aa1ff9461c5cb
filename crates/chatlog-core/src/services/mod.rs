pub mod messages;

pub use messages::{MessagePage, Pagination, create_message, list_room_messages};
