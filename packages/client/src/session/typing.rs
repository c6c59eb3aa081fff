//! Typing indicators, local and remote.
//!
//! Remote entries carry an explicit expiry timestamp and are removed by a
//! periodic sweep instead of per-entry timers. Local typing is an idle
//! deadline pushed forward on every keystroke; when it lapses the caller
//! emits an explicit typing-stopped notification.

use std::collections::HashMap;

use crate::domain::{Timestamp, UserId, Username};
use crate::session::event::TypingScope;

/// How long a typing indicator stays alive without a refresh.
pub const TYPING_TTL_MS: i64 = 3_000;

/// A transient "peer is composing" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    pub username: Username,
    pub scope: TypingScope,
    pub expires_at: Timestamp,
}

#[derive(Debug)]
struct LocalTyping {
    scope: TypingScope,
    deadline: Timestamp,
}

#[derive(Debug, Default)]
pub struct TypingTracker {
    /// Keyed by peer id so duplicate events refresh instead of duplicating.
    remote: HashMap<UserId, TypingEntry>,
    local: Option<LocalTyping>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local keystroke scoped to `scope`.
    ///
    /// Returns true when a typing-started notification should be emitted:
    /// on the first keystroke since the last idle period, or when the
    /// scope changed mid-composition.
    pub fn refresh_local(&mut self, scope: TypingScope, now: Timestamp) -> bool {
        let deadline = Timestamp::new(now.value() + TYPING_TTL_MS);
        let started = match &self.local {
            Some(local) => local.scope != scope,
            None => true,
        };
        self.local = Some(LocalTyping { scope, deadline });
        started
    }

    /// Whether the local user currently counts as typing.
    pub fn is_local_typing(&self) -> bool {
        self.local.is_some()
    }

    /// Stop local typing explicitly (message sent). Returns the scope the
    /// typing-stopped notification must target, if one was active.
    pub fn stop_local(&mut self) -> Option<TypingScope> {
        self.local.take().map(|local| local.scope)
    }

    /// Cancel local typing without emitting anything (teardown).
    pub fn cancel_local(&mut self) {
        self.local = None;
    }

    /// Add or refresh a remote entry. Entries scoped to inactive contexts
    /// are kept too (they expire like any other) and are filtered at
    /// render time by `typing_in`.
    pub fn on_remote(
        &mut self,
        peer_id: UserId,
        username: Username,
        scope: TypingScope,
        is_typing: bool,
        now: Timestamp,
    ) {
        if is_typing {
            self.remote.insert(
                peer_id,
                TypingEntry {
                    username,
                    scope,
                    expires_at: Timestamp::new(now.value() + TYPING_TTL_MS),
                },
            );
        } else {
            self.remote.remove(&peer_id);
        }
    }

    /// Sweep expired remote entries and the lapsed local deadline.
    ///
    /// Returns the scope of a typing-stopped notification to emit when the
    /// local idle timer fired with no further input.
    pub fn prune(&mut self, now: Timestamp) -> Option<TypingScope> {
        self.remote.retain(|_, entry| entry.expires_at > now);
        match &self.local {
            Some(local) if local.deadline <= now => self.stop_local(),
            _ => None,
        }
    }

    /// Drop everything scoped to `scope` (e.g. a room just left): remote
    /// entries and, when it targets the same scope, the pending local
    /// deadline. Nothing is emitted for a context that no longer exists.
    pub fn discard_scope(&mut self, scope: &TypingScope) {
        self.remote.retain(|_, entry| &entry.scope != scope);
        if matches!(&self.local, Some(local) if &local.scope == scope) {
            self.local = None;
        }
    }

    /// Display names of peers currently typing in `scope`, for rendering.
    pub fn typing_in(&self, scope: &TypingScope) -> Vec<&Username> {
        self.remote
            .values()
            .filter(|entry| &entry.scope == scope)
            .map(|entry| &entry.username)
            .collect()
    }
}
