//! Domain layer for the chat client.
//!
//! This module contains the chat vocabulary that is independent of
//! wire DTOs and transport concerns.

pub mod entity;
pub mod error;
pub mod value_object;

pub use entity::{ChatMessage, DirectConversation, MessageKind, Peer};
pub use error::ValueObjectError;
pub use value_object::{ActiveContext, Identity, RoomName, Timestamp, UserId, Username};
