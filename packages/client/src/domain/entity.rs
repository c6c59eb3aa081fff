//! Entities for the chat domain.

use serde::{Deserialize, Serialize};

use super::value_object::{Timestamp, UserId, Username};

/// Kind of an entry in a message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    /// A chat message authored by a user.
    Message,
    /// A synthetic notice inserted locally (join/leave/delivery failure).
    /// Never sent over the wire.
    System,
}

/// An immutable entry in a room log or direct conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author ("system" for local notices).
    pub author: String,
    pub text: String,
    pub sent_at: Timestamp,
    pub kind: MessageKind,
}

impl ChatMessage {
    /// Create a user-authored message.
    pub fn user(author: impl Into<String>, text: impl Into<String>, sent_at: Timestamp) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            sent_at,
            kind: MessageKind::Message,
        }
    }

    /// Create a locally synthesized system notice.
    pub fn system(text: impl Into<String>, sent_at: Timestamp) -> Self {
        Self {
            author: "system".to_string(),
            text: text.into(),
            sent_at,
            kind: MessageKind::System,
        }
    }
}

/// Another connected identity, as reported by the roster.
///
/// Peers are ephemeral: they exist in the presence set only while online.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub peer_id: UserId,
    pub username: Username,
}

/// One private thread with a single peer: its ordered log and unread flag.
///
/// Created lazily on first send or first receive, never removed for the
/// lifetime of the connection, even if the peer goes offline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectConversation {
    pub messages: Vec<ChatMessage>,
    pub has_unread: bool,
}
