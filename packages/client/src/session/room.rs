//! Room membership and the room message log.
//!
//! A user is a member of at most one room at a time. Joining a new room
//! implicitly leaves the previous one and clears the log. Messages are
//! appended in receipt order; no reordering or deduplication is performed.

use crate::domain::{ChatMessage, RoomName, Timestamp};

/// Membership state plus the ordered log for the joined room.
#[derive(Debug, Default)]
pub struct RoomSession {
    joined: Option<RoomName>,
    log: Vec<ChatMessage>,
}

impl RoomSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The room currently joined, if any.
    pub fn joined(&self) -> Option<&RoomName> {
        self.joined.as_ref()
    }

    /// The ordered message log for the joined room.
    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Enter `room`: clears the log and reseeds it with the local join
    /// notice. The caller is responsible for leaving the previous room.
    pub fn begin(&mut self, room: RoomName, now: Timestamp) {
        self.log.clear();
        self.log.push(ChatMessage::system(
            format!("You have joined the room {}", room.as_str()),
            now,
        ));
        self.joined = Some(room);
    }

    /// Leave the current room, clearing the log. Returns the room that was
    /// joined so the caller can emit the leave notification.
    pub fn end(&mut self) -> Option<RoomName> {
        self.log.clear();
        self.joined.take()
    }

    /// Append a message received for `room`. Returns false (and drops the
    /// message) when `room` is not the joined room — defends against
    /// stale events from a room just left.
    pub fn append_remote(&mut self, room: &RoomName, message: ChatMessage) -> bool {
        match &self.joined {
            Some(joined) if joined == room => {
                self.log.push(message);
                true
            }
            _ => false,
        }
    }

    /// Append a locally synthesized join/leave notice, iff `room` is the
    /// joined room.
    pub fn append_notice(&mut self, room: &RoomName, text: String, now: Timestamp) -> bool {
        match &self.joined {
            Some(joined) if joined == room => {
                self.log.push(ChatMessage::system(text, now));
                true
            }
            _ => false,
        }
    }

    /// Append the optimistic local echo of an outbound room message.
    pub fn append_local(&mut self, message: ChatMessage) {
        self.log.push(message);
    }
}
