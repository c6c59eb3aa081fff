//! Canonical session events.
//!
//! Every transport payload is normalized into one of these typed events at
//! the wire boundary before it reaches the session state machine. Field
//! fallbacks and optional-field guessing live in `infrastructure::dto`,
//! never here.

use crate::domain::{Peer, RoomName, Timestamp, UserId, Username};

/// Context a typing notification is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingScope {
    /// Typing inside a broadcast room.
    Room(RoomName),
    /// Typing inside the direct conversation with this peer.
    ///
    /// For inbound events this is the typist; for outbound events the
    /// receiver of the eventual message.
    Peer(UserId),
}

/// Inbound transport events, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A broadcast message for a room.
    RoomMessage {
        room: RoomName,
        sender_id: UserId,
        sender_name: Username,
        content: String,
        timestamp: Timestamp,
    },
    /// A direct message addressed to the local user.
    PrivateMessage {
        sender_id: UserId,
        sender_name: Username,
        content: String,
        timestamp: Timestamp,
    },
    /// Delivery acknowledgement for a direct message. Informational.
    PrivateDelivered { receiver_name: Username },
    /// A direct message could not be delivered.
    PrivateFailed {
        receiver_id: UserId,
        reason: String,
        timestamp: Timestamp,
    },
    /// A peer joined a room.
    UserJoined {
        username: Username,
        room: RoomName,
        timestamp: Timestamp,
    },
    /// A peer left a room.
    UserLeft {
        username: Username,
        room: RoomName,
        timestamp: Timestamp,
    },
    /// Full roster snapshot. Always replaces the tracked set.
    OnlineUsers(Vec<Peer>),
    /// A peer started or stopped typing in some context.
    UserTyping {
        user_id: UserId,
        username: Username,
        scope: TypingScope,
        is_typing: bool,
    },
    /// Transport session closed. Informational.
    Disconnected,
}

/// Outbound transport events emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Request a full roster snapshot.
    GetOnlineUsers,
    JoinRoom {
        room: RoomName,
    },
    LeaveRoom {
        room: RoomName,
    },
    SendMessage {
        content: String,
        sender_id: UserId,
        sender_name: Username,
        room: RoomName,
        timestamp: Timestamp,
    },
    PrivateMessage {
        content: String,
        sender_id: UserId,
        sender_name: Username,
        receiver_id: UserId,
        /// Locally generated id, used only for delivery/failure correlation.
        message_id: String,
        timestamp: Timestamp,
    },
    Typing {
        user_id: UserId,
        username: Username,
        scope: TypingScope,
        is_typing: bool,
    },
}
