//! Login handshake gate.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────────┐   hello    ┌─────────────┐
//! │ AwaitingHandshake │───────────>│ Established │
//! └───────────────────┘            └─────────────┘
//!           │                             │
//!           │ any other tag               │ close
//!           │         ┌────────┐          │
//!           └────────>│ Closed │<─────────┘
//!                     └────────┘
//! ```
//!
//! Only the first tagged push frame is inspected. Once established the gate
//! passes everything through and never re-evaluates; `Closed` is terminal.

use huddle_proto::HELLO_TYPE;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, waiting for the server's `hello`
    AwaitingHandshake,
    /// Handshake complete, events flow
    Established,
    /// Session over (handshake failure, local close or transport close)
    Closed,
}

/// What to do with a push frame after the gate has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Frame completed the handshake
    Established,
    /// Frame failed the handshake; the session is now closed
    Rejected,
    /// Session is established; classify the frame normally
    PassThrough,
    /// Session is closed; drop the frame
    Dropped,
}

/// Two-state gate in front of push-frame classification.
#[derive(Debug, Clone)]
pub struct Handshake {
    state: SessionState,
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

impl Handshake {
    /// Create a gate in [`SessionState::AwaitingHandshake`].
    pub fn new() -> Self {
        Self { state: SessionState::AwaitingHandshake }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Feed the type tag of a push frame through the gate.
    pub fn observe(&mut self, kind: &str) -> HandshakeStep {
        match self.state {
            SessionState::AwaitingHandshake if kind == HELLO_TYPE => {
                self.state = SessionState::Established;
                HandshakeStep::Established
            },
            SessionState::AwaitingHandshake => {
                self.state = SessionState::Closed;
                HandshakeStep::Rejected
            },
            SessionState::Established => HandshakeStep::PassThrough,
            SessionState::Closed => HandshakeStep::Dropped,
        }
    }

    /// Move to [`SessionState::Closed`].
    ///
    /// Returns `false` if the gate was already closed.
    pub fn close(&mut self) -> bool {
        let was_open = self.state != SessionState::Closed;
        self.state = SessionState::Closed;
        was_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_establishes() {
        let mut handshake = Handshake::new();
        assert_eq!(handshake.state(), SessionState::AwaitingHandshake);

        assert_eq!(handshake.observe("hello"), HandshakeStep::Established);
        assert_eq!(handshake.state(), SessionState::Established);
    }

    #[test]
    fn other_first_frame_closes() {
        let mut handshake = Handshake::new();
        assert_eq!(handshake.observe("error"), HandshakeStep::Rejected);
        assert_eq!(handshake.state(), SessionState::Closed);
    }

    #[test]
    fn established_is_inert() {
        let mut handshake = Handshake::new();
        handshake.observe("hello");

        assert_eq!(handshake.observe("hello"), HandshakeStep::PassThrough);
        assert_eq!(handshake.observe("error"), HandshakeStep::PassThrough);
        assert_eq!(handshake.state(), SessionState::Established);
    }

    #[test]
    fn closed_is_terminal() {
        let mut handshake = Handshake::new();
        handshake.observe("hello");
        assert!(handshake.close());

        assert_eq!(handshake.observe("hello"), HandshakeStep::Dropped);
        assert_eq!(handshake.state(), SessionState::Closed);
        assert!(!handshake.close());
    }

    #[test]
    fn close_before_handshake() {
        let mut handshake = Handshake::new();
        assert!(handshake.close());
        assert_eq!(handshake.observe("hello"), HandshakeStep::Dropped);
    }
}
