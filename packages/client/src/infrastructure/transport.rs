//! WebSocket transport for the realtime session.
//!
//! Exactly one connection per identity. The socket is split into a reader
//! task (text frame → wire DTO → normalized [`InboundEvent`]) and a writer
//! task ([`OutboundEvent`] → JSON text frame); the session multiplexes the
//! room and every DM over this single pair of channels.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::domain::Identity;
use crate::infrastructure::dto::wire::{ClientFrame, ServerFrame};
use crate::session::event::{InboundEvent, OutboundEvent};

/// Errors establishing or using the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// WebSocket handshake or connection error
    #[error("websocket connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

/// A live WebSocket session plus its reader/writer tasks.
pub struct Transport {
    outbound_tx: UnboundedSender<OutboundEvent>,
    inbound_rx: UnboundedReceiver<InboundEvent>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl Transport {
    /// Open the connection, identifying as `identity` via the `userId` and
    /// `username` query parameters bound at connect time.
    pub async fn connect(server_url: &str, identity: &Identity) -> Result<Self, TransportError> {
        let url = format!(
            "{}/ws?userId={}&username={}",
            server_url.trim_end_matches('/'),
            identity.user_id.as_str(),
            identity.username.as_str(),
        );
        let (socket, _response) = tokio_tungstenite::connect_async(&url).await?;
        tracing::info!(user = identity.username.as_str(), "websocket session open");

        let (mut sink, mut stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<OutboundEvent>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<InboundEvent>();

        let writer_task = tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let frame = ClientFrame::from(event);
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("failed to serialize outbound frame: {e}");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json.into())).await {
                    tracing::warn!("websocket send failed: {e}");
                    break;
                }
            }
            // Channel closed: every sender is gone, close the socket
            let _ = sink.close().await;
        });

        let reader_task = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => match InboundEvent::try_from(frame) {
                            Ok(event) => {
                                if inbound_tx.send(event).is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("dropping malformed frame: {e}"),
                        },
                        Err(e) => tracing::warn!("dropping unrecognized frame: {e}"),
                    },
                    Ok(Message::Close(_)) => {
                        let _ = inbound_tx.send(InboundEvent::Disconnected);
                        break;
                    }
                    // Ping/pong are answered by the library
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("websocket receive failed: {e}");
                        let _ = inbound_tx.send(InboundEvent::Disconnected);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            outbound_tx,
            inbound_rx,
            reader_task,
            writer_task,
        })
    }

    /// Sender half handed to the session; cloning is cheap.
    pub fn outbound(&self) -> UnboundedSender<OutboundEvent> {
        self.outbound_tx.clone()
    }

    /// Next normalized inbound event, or None when the connection closed.
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        self.inbound_rx.recv().await
    }

    /// Drain queued outbound events and close the socket. The session's
    /// sender clone must be dropped before this is awaited, otherwise the
    /// writer keeps waiting for more events.
    pub async fn close(self) {
        drop(self.outbound_tx);
        if self.writer_task.await.is_err() {
            tracing::warn!("transport writer task panicked during shutdown");
        }
        self.reader_task.abort();
    }
}
