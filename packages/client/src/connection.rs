//! Connection manager: owns the single realtime session bound to the
//! current identity.
//!
//! At most one `(identity, session, transport)` triple is live. Connecting
//! with a different identity tears the prior connection down first, and a
//! fresh [`ChatSession`] is built per connection so direct conversations
//! never survive a reconnect.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{Identity, ValueObjectError};
use crate::infrastructure::transport::{Transport, TransportError};
use crate::session::event::InboundEvent;
use crate::session::{ChatSession, NotificationSink};

/// Errors surfaced by the connection manager.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Supplied user id or username failed domain validation
    #[error(transparent)]
    InvalidIdentity(#[from] ValueObjectError),
}

struct ActiveConnection {
    identity: Identity,
    session: ChatSession,
    transport: Transport,
}

/// Owner of the single realtime connection.
pub struct ChatClient {
    server_url: String,
    notifier: Arc<dyn NotificationSink>,
    active: Option<ActiveConnection>,
}

impl ChatClient {
    pub fn new(server_url: impl Into<String>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            server_url: server_url.into(),
            notifier,
            active: None,
        }
    }

    /// Open a connection identified as `user_id`/`username`.
    ///
    /// A no-op (returns false) when the identity is empty or when the same
    /// identity is already connected. A different identity tears the prior
    /// connection down first, emitting the leave-room notification while
    /// still joined. On success the fresh session immediately requests the
    /// online roster.
    pub async fn connect(&mut self, user_id: &str, username: &str) -> Result<bool, ClientError> {
        let user_id = user_id.trim();
        let username = username.trim();
        if user_id.is_empty() || username.is_empty() {
            tracing::debug!("connect skipped: identity not yet available");
            return Ok(false);
        }
        let identity = Identity::new(user_id.to_string(), username.to_string())?;

        if let Some(active) = &self.active {
            if active.identity == identity {
                return Ok(false);
            }
        }
        self.disconnect().await;

        let transport = Transport::connect(&self.server_url, &identity).await?;
        let mut session =
            ChatSession::new(identity.clone(), transport.outbound(), self.notifier.clone());
        session.on_connected();

        self.active = Some(ActiveConnection {
            identity,
            session,
            transport,
        });
        Ok(true)
    }

    /// Tear the current connection down. Safe to call when already
    /// disconnected. A joined room gets its leave-room notification before
    /// the socket closes.
    pub async fn disconnect(&mut self) {
        if let Some(active) = self.active.take() {
            let ActiveConnection {
                identity,
                mut session,
                transport,
            } = active;
            session.disconnect();
            // Drop the session (and its outbound sender clone) so the
            // writer can drain the queued leave-room and close the socket
            drop(session);
            transport.close().await;
            tracing::info!(user = identity.username.as_str(), "disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    pub fn session_mut(&mut self) -> Option<&mut ChatSession> {
        self.active.as_mut().map(|a| &mut a.session)
    }

    /// Next inbound event from the live transport, or None when there is
    /// no connection or it closed.
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        match &mut self.active {
            Some(active) => active.transport.recv().await,
            None => None,
        }
    }
}
