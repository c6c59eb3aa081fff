//! Realtime chat client library for Aizuchi.
//!
//! Provides the client-side state machine for rooms, direct messages,
//! presence and typing indicators over a single WebSocket session, plus
//! the interactive CLI front end.

pub mod connection;
pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod ui;

// Re-export entry points
pub use connection::{ChatClient, ClientError};
pub use session::ChatSession;
pub use ui::{run_client, ClientConfig};
