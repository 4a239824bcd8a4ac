//! Errors surfaced to listeners.
//!
//! These travel inside [`crate::Signal::Error`] rather than through `Result`:
//! the frame-processing context has no caller to return them to.

use huddle_proto::{OutboundMessage, RemoteError};
use thiserror::Error;

/// Protocol or remote fault reported to listeners.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Server refused the handshake with an error frame
    #[error("handshake rejected: {0}")]
    HandshakeRejected(RemoteError),

    /// First push frame was not `hello` and carried no error details
    #[error("handshake failed: expected hello, received `{kind}`")]
    HandshakeFailed {
        /// Type tag of the offending frame
        kind: String,
    },

    /// Server pushed an error frame after the session was established
    #[error("{0}")]
    Remote(RemoteError),

    /// An outbound message was rejected
    #[error("message {reply_to} rejected{}", .error.as_ref().map(|e| format!(": {e}")).unwrap_or_default())]
    Rejected {
        /// Correlation id of the rejected message
        reply_to: u64,
        /// The message as submitted
        message: OutboundMessage,
        /// Rejection details, if the server sent any
        error: Option<RemoteError>,
    },
}

impl SessionError {
    /// Server error code, when the server supplied one.
    pub fn code(&self) -> Option<i64> {
        self.remote().map(|e| e.code)
    }

    /// Server-supplied error, when there is one.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::HandshakeRejected(e) | Self::Remote(e) => Some(e),
            Self::Rejected { error, .. } => error.as_ref(),
            Self::HandshakeFailed { .. } => None,
        }
    }

    /// Whether this error ended the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HandshakeRejected(_) | Self::HandshakeFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_display_with_and_without_details() {
        let message = OutboundMessage::new("C1", "hi");
        let detailed = SessionError::Rejected {
            reply_to: 3,
            message: message.clone(),
            error: Some(RemoteError::new(2, "no_text")),
        };
        assert_eq!(detailed.to_string(), "message 3 rejected: remote error 2: no_text");
        assert_eq!(detailed.code(), Some(2));

        let bare = SessionError::Rejected { reply_to: 3, message, error: None };
        assert_eq!(bare.to_string(), "message 3 rejected");
        assert_eq!(bare.code(), None);
    }

    #[test]
    fn handshake_errors_are_fatal() {
        assert!(SessionError::HandshakeFailed { kind: "message".into() }.is_fatal());
        assert!(SessionError::HandshakeRejected(RemoteError::new(1, "not_authed")).is_fatal());
        assert!(!SessionError::Remote(RemoteError::new(1, "x")).is_fatal());
    }
}
