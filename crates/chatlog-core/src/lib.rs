//! chatlog-core: room-scoped message history.
//!
//! - [`validation`] checks inbound create payloads.
//! - [`entities`] persists messages ([`entities::MessageStore`]).
//! - [`services`] applies the create flow and the pagination policy.

pub mod entities;
pub mod error;
pub mod schemas;
pub mod services;
pub mod validation;

pub use entities::{AnyStore, MessageRecord, MessageStore, NewMessage};
pub use error::{FieldViolation, MessageError, StoreOperation};
