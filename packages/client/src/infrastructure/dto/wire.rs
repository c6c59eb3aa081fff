//! WebSocket message DTOs for the realtime contract.
//!
//! Frames are JSON objects tagged by a kebab-case `type` field with
//! camelCase payload fields. Several server payloads are duck-typed
//! (`senderId` may be absent, typing events carry either `roomId` or
//! `receiverId`); all of that guessing happens here, in one adapter,
//! producing a canonical [`InboundEvent`] before anything reaches the
//! session state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Peer, RoomName, Timestamp, UserId, Username, ValueObjectError};
use crate::session::event::{InboundEvent, OutboundEvent, TypingScope};

/// Errors raised while normalizing a server frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A payload field failed domain validation
    #[error("malformed frame field: {0}")]
    InvalidField(#[from] ValueObjectError),

    /// A typing event carried neither a room nor a receiver
    #[error("typing event carries neither roomId nor receiverId")]
    MissingTypingScope,
}

/// One roster entry in an `online-users` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUserDto {
    pub user_id: Option<String>,
    pub username: String,
}

/// Inbound frames, as received from the messaging server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerFrame {
    #[serde(rename_all = "camelCase")]
    ReceiveMessage {
        room_id: String,
        sender_id: Option<String>,
        sender_name: String,
        content: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    PrivateMessage {
        sender_id: Option<String>,
        sender_name: String,
        content: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    PrivateMessageDelivered { receiver_name: String },
    #[serde(rename_all = "camelCase")]
    PrivateMessageFailed {
        receiver_id: String,
        reason: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    UserJoined {
        username: String,
        room_id: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        username: String,
        room_id: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    OnlineUsers { users: Vec<OnlineUserDto> },
    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: Option<String>,
        username: String,
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        receiver_id: Option<String>,
        #[serde(default)]
        is_private: bool,
        is_typing: bool,
    },
}

impl TryFrom<ServerFrame> for InboundEvent {
    type Error = WireError;

    fn try_from(frame: ServerFrame) -> Result<Self, Self::Error> {
        match frame {
            ServerFrame::ReceiveMessage {
                room_id,
                sender_id,
                sender_name,
                content,
                timestamp,
            } => Ok(InboundEvent::RoomMessage {
                room: RoomName::new(room_id)?,
                // Some server builds omit senderId; fall back to the name
                sender_id: UserId::new(sender_id.unwrap_or_else(|| sender_name.clone()))?,
                sender_name: Username::new(sender_name)?,
                content,
                timestamp: Timestamp::new(timestamp),
            }),
            ServerFrame::PrivateMessage {
                sender_id,
                sender_name,
                content,
                timestamp,
            } => Ok(InboundEvent::PrivateMessage {
                sender_id: UserId::new(sender_id.unwrap_or_else(|| sender_name.clone()))?,
                sender_name: Username::new(sender_name)?,
                content,
                timestamp: Timestamp::new(timestamp),
            }),
            ServerFrame::PrivateMessageDelivered { receiver_name } => {
                Ok(InboundEvent::PrivateDelivered {
                    receiver_name: Username::new(receiver_name)?,
                })
            }
            ServerFrame::PrivateMessageFailed {
                receiver_id,
                reason,
                timestamp,
            } => Ok(InboundEvent::PrivateFailed {
                receiver_id: UserId::new(receiver_id)?,
                reason,
                timestamp: Timestamp::new(timestamp),
            }),
            ServerFrame::UserJoined {
                username,
                room_id,
                timestamp,
            } => Ok(InboundEvent::UserJoined {
                username: Username::new(username)?,
                room: RoomName::new(room_id)?,
                timestamp: Timestamp::new(timestamp),
            }),
            ServerFrame::UserLeft {
                username,
                room_id,
                timestamp,
            } => Ok(InboundEvent::UserLeft {
                username: Username::new(username)?,
                room: RoomName::new(room_id)?,
                timestamp: Timestamp::new(timestamp),
            }),
            ServerFrame::OnlineUsers { users } => {
                let peers = users
                    .into_iter()
                    .map(|u| -> Result<Peer, WireError> {
                        Ok(Peer {
                            peer_id: UserId::new(
                                u.user_id.unwrap_or_else(|| u.username.clone()),
                            )?,
                            username: Username::new(u.username)?,
                        })
                    })
                    .collect::<Result<Vec<_>, WireError>>()?;
                Ok(InboundEvent::OnlineUsers(peers))
            }
            ServerFrame::UserTyping {
                user_id,
                username,
                room_id,
                receiver_id,
                is_private,
                is_typing,
            } => {
                let typist = UserId::new(user_id.unwrap_or_else(|| username.clone()))?;
                let scope = if is_private || receiver_id.is_some() {
                    // Private typing targets the local user; the scope of
                    // interest is the typist's own conversation
                    TypingScope::Peer(typist.clone())
                } else {
                    match room_id {
                        Some(room) => TypingScope::Room(RoomName::new(room)?),
                        None => return Err(WireError::MissingTypingScope),
                    }
                };
                Ok(InboundEvent::UserTyping {
                    user_id: typist,
                    username: Username::new(username)?,
                    scope,
                    is_typing,
                })
            }
        }
    }
}

/// Outbound frames, as sent to the messaging server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    GetOnlineUsers,
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_name: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_name: String },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        content: String,
        sender_id: String,
        sender_name: String,
        room_id: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    PrivateMessage {
        content: String,
        sender_id: String,
        sender_name: String,
        receiver_id: String,
        message_id: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Typing {
        user_id: String,
        username: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        room_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        receiver_id: Option<String>,
        is_typing: bool,
    },
}

impl From<OutboundEvent> for ClientFrame {
    fn from(event: OutboundEvent) -> Self {
        match event {
            OutboundEvent::GetOnlineUsers => ClientFrame::GetOnlineUsers,
            OutboundEvent::JoinRoom { room } => ClientFrame::JoinRoom {
                room_name: room.into_string(),
            },
            OutboundEvent::LeaveRoom { room } => ClientFrame::LeaveRoom {
                room_name: room.into_string(),
            },
            OutboundEvent::SendMessage {
                content,
                sender_id,
                sender_name,
                room,
                timestamp,
            } => ClientFrame::SendMessage {
                content,
                sender_id: sender_id.into_string(),
                sender_name: sender_name.into_string(),
                room_id: room.into_string(),
                timestamp: timestamp.value(),
            },
            OutboundEvent::PrivateMessage {
                content,
                sender_id,
                sender_name,
                receiver_id,
                message_id,
                timestamp,
            } => ClientFrame::PrivateMessage {
                content,
                sender_id: sender_id.into_string(),
                sender_name: sender_name.into_string(),
                receiver_id: receiver_id.into_string(),
                message_id,
                timestamp: timestamp.value(),
            },
            OutboundEvent::Typing {
                user_id,
                username,
                scope,
                is_typing,
            } => {
                let (room_id, receiver_id) = match scope {
                    TypingScope::Room(room) => (Some(room.into_string()), None),
                    TypingScope::Peer(peer) => (None, Some(peer.into_string())),
                };
                ClientFrame::Typing {
                    user_id: user_id.into_string(),
                    username: username.into_string(),
                    room_id,
                    receiver_id,
                    is_typing,
                }
            }
        }
    }
}
