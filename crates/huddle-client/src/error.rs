//! Client error types.

use std::time::Duration;

use huddle_proto::DecodeError;
use thiserror::Error;

/// Failure to open a session.
///
/// Raised once, from [`crate::Session::connect`]. No session exists
/// afterwards and nothing is retried.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Snapshot payload is missing the self id or the endpoint
    #[error("invalid session snapshot: {0}")]
    Snapshot(#[from] DecodeError),

    /// Endpoint is not a usable WebSocket URL
    #[error("invalid endpoint `{url}`: {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Socket-level failure while connecting
    #[error("connect I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Connect did not finish in time
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// Connect was interrupted before it finished
    #[error("connect interrupted")]
    Interrupted,

    /// Any other transport fault during the opening handshake
    #[error("transport error during connect: {0}")]
    Transport(String),
}

/// Transport-level send failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection is no longer running
    #[error("transport closed")]
    Closed,
}

/// Failure to send a message on an open session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Session is closed
    #[error("session closed")]
    Closed,

    /// Transport refused the frame
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Message could not be encoded
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
