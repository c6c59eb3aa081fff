//! Session layer error definitions.

use thiserror::Error;

use crate::domain::ValueObjectError;

/// Errors rejected synchronously at the composer boundary. Nothing is
/// emitted to the transport and the buffer is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Empty or whitespace-only buffer
    #[error("message is empty")]
    EmptyMessage,

    /// Neither joined to a room nor a peer selected
    #[error("no active room or conversation to send to")]
    NoActiveContext,
}

/// Errors from session operations outside the composer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A locally supplied value failed domain validation
    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),

    /// The realtime session is not established
    #[error("not connected")]
    NotConnected,
}
