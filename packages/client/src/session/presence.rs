//! オンラインユーザーの Presence 管理
//!
//! ローカル状態は常にフルロースター置き換えで更新する。差分パッチは
//! 行わない（ドリフト防止のため、join/leave のたびにロースターを
//! 再取得する方針）。

use crate::domain::{Identity, Peer};

/// Live set of other connected peers.
///
/// Invariant: the tracked set never contains the local identity, matched
/// by `user_id` or by `username` fallback.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    peers: Vec<Peer>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire tracked set with a fresh roster snapshot,
    /// excluding the local identity.
    pub fn replace_roster(&mut self, peers: Vec<Peer>, local: &Identity) {
        let mut peers: Vec<Peer> = peers
            .into_iter()
            .filter(|p| p.peer_id != local.user_id && p.username != local.username)
            .collect();
        // Sort by display name for stable rendering
        peers.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        self.peers = peers;
    }

    /// Currently tracked peers, sorted by display name.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Look a peer up by id or by display name.
    pub fn find(&self, id_or_name: &str) -> Option<&Peer> {
        self.peers
            .iter()
            .find(|p| p.peer_id.as_str() == id_or_name || p.username.as_str() == id_or_name)
    }
}
