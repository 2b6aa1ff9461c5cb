//! Wire types shared by the service layer and the HTTP surface.

pub mod message;

pub use message::{CreateMessageRequest, MessageResponse, PageQuery, PaginatedMessages};
