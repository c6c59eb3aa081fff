//! Infrastructure layer: wire DTOs, the WebSocket transport and the
//! notification sink used by the CLI.

pub mod dto;
pub mod notification;
pub mod transport;

pub use notification::LogNotificationSink;
pub use transport::{Transport, TransportError};
