//! Direct conversation store: one independent log and unread flag per peer.
//!
//! Entries are created lazily on first send or first receive and are never
//! removed for the lifetime of the connection, even if the peer goes
//! offline. They are process-local: a reconnect starts with an empty store.

use std::collections::HashMap;

use crate::domain::{ChatMessage, DirectConversation, UserId};

#[derive(Debug, Default)]
pub struct DirectConversationStore {
    conversations: HashMap<UserId, DirectConversation>,
}

impl DirectConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conversation with `peer_id`, if one exists yet.
    pub fn get(&self, peer_id: &UserId) -> Option<&DirectConversation> {
        self.conversations.get(peer_id)
    }

    /// Mutable access to an existing conversation. Never creates one.
    pub fn get_mut(&mut self, peer_id: &UserId) -> Option<&mut DirectConversation> {
        self.conversations.get_mut(peer_id)
    }

    /// The conversation with `peer_id`, created lazily.
    pub fn entry(&mut self, peer_id: UserId) -> &mut DirectConversation {
        self.conversations.entry(peer_id).or_default()
    }

    /// Append a message to the conversation with `peer_id`.
    pub fn append(&mut self, peer_id: UserId, message: ChatMessage) {
        self.entry(peer_id).messages.push(message);
    }

    /// Clear the unread flag for `peer_id`. A no-op when no conversation
    /// exists yet.
    pub fn mark_read(&mut self, peer_id: &UserId) {
        if let Some(conversation) = self.conversations.get_mut(peer_id) {
            conversation.has_unread = false;
        }
    }

    /// Peers whose conversations currently carry unread messages.
    pub fn unread_peers(&self) -> Vec<&UserId> {
        self.conversations
            .iter()
            .filter(|(_, c)| c.has_unread)
            .map(|(id, _)| id)
            .collect()
    }
}
