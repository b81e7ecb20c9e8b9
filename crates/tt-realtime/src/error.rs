//! Error types for realtime fan-out.

use thiserror::Error;

/// Result type for broadcast operations.
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Errors that can occur while emitting events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// The broadcaster is not accepting events.
    #[error("broadcaster unavailable: {0}")]
    Unavailable(String),

    /// The connection is not registered with the hub.
    #[error("unknown connection: {0}")]
    UnknownConnection(uuid::Uuid),

    /// A room name did not parse.
    #[error("invalid room: {0}")]
    InvalidRoom(String),

    /// An event payload could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),
}
