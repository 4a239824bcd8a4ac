//! Session composition root.
//!
//! [`SessionCore`] routes each inbound frame to the correlator or through the
//! handshake gate to the classifier, and turns the outcome into
//! [`SessionAction`]s. The driver executes the actions in order: broadcasts
//! go to its [`crate::Dispatcher`], a close tears the transport down.
//!
//! Frames are expected one at a time from a single processing context;
//! [`SessionCore::prepare_message`] and [`SessionCore::close`] may be called
//! from any thread meanwhile.

use huddle_proto::{
    DecodeError, ERROR_TYPE, FrameError, InboundFrame, OutboundMessage, PushFrame, RemoteError,
    Reply, SessionSnapshot, User,
};
use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    Classified, Correlator, Directory, Handshake, HandshakeStep, Notification, Resolution,
    SentEvent, SessionError, SessionState, Signal, classify,
};

/// Side effect requested by [`SessionCore::handle_text`].
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum SessionAction {
    /// Deliver a signal to every listener
    Broadcast(Signal),
    /// Close the transport and announce [`Signal::Closed`]
    Close {
        /// Why the session is closing
        reason: String,
    },
}

/// Transport-agnostic session state.
#[derive(Debug)]
pub struct SessionCore {
    directory: Directory,
    correlator: Correlator,
    handshake: Mutex<Handshake>,
}

impl SessionCore {
    /// Create a session awaiting its handshake.
    pub fn new(directory: Directory) -> Self {
        Self { directory, correlator: Correlator::new(), handshake: Mutex::new(Handshake::new()) }
    }

    /// Create a session whose directory is loaded from `snapshot`.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self::new(Directory::load(snapshot))
    }

    /// User and channel directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The authenticated user, if the directory knows it.
    pub fn self_user(&self) -> Option<&User> {
        self.directory.self_user()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.handshake.lock().state()
    }

    /// Number of sent messages still awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.correlator.pending_count()
    }

    /// Mark the session closed. Returns `false` if it already was.
    pub fn close(&self) -> bool {
        self.handshake.lock().close()
    }

    /// Assign an id to `message` and encode its frame.
    ///
    /// The message is pending from this point on. If encoding fails it is
    /// withdrawn again and its id is not reused.
    pub fn prepare_message(
        &self,
        message: OutboundMessage,
    ) -> Result<(u64, String), serde_json::Error> {
        let id = self.correlator.submit(message.clone());

        match message.encode(id) {
            Ok(frame) => Ok((id, frame)),
            Err(error) => {
                self.correlator.cancel(id);
                Err(error)
            },
        }
    }

    /// Withdraw a prepared message whose frame never reached the wire.
    pub fn abandon_message(&self, id: u64) -> Option<OutboundMessage> {
        self.correlator.cancel(id)
    }

    /// Process one inbound text frame.
    ///
    /// Text that is not a JSON object is returned as an error for the driver
    /// to log. Frames that parse but carry bad content are logged here and
    /// yield no actions.
    pub fn handle_text(&self, text: &str) -> Result<Vec<SessionAction>, FrameError> {
        let actions = match InboundFrame::parse(text)? {
            InboundFrame::Reply(value) => self.handle_reply(&value),
            InboundFrame::Push(frame) => self.handle_push(&frame),
        };

        Ok(actions.unwrap_or_else(|error| {
            tracing::warn!(%error, frame = text, "dropping undecodable frame");
            Vec::new()
        }))
    }

    fn handle_reply(&self, value: &Value) -> Result<Vec<SessionAction>, DecodeError> {
        if self.state() == SessionState::Closed {
            tracing::debug!("dropping reply received after close");
            return Ok(Vec::new());
        }

        let reply = Reply::decode(value)?;
        if let Some(error) = Reply::error_fault(value) {
            tracing::warn!(%error, reply_to = reply.reply_to, "ignoring malformed reply error body");
        }

        let Some(resolution) = self.correlator.resolve(&reply) else {
            tracing::debug!(reply_to = reply.reply_to, "dropping reply for unknown request");
            return Ok(Vec::new());
        };

        let signal = match resolution {
            Resolution::Acknowledged { id, message, ts } => {
                tracing::trace!(id, "message acknowledged");
                Signal::Event(Notification::Sent(SentEvent {
                    id,
                    message,
                    user: self.self_user().cloned(),
                    ts,
                }))
            },
            Resolution::Rejected { id, message, error } => {
                tracing::debug!(id, ?error, "message rejected");
                Signal::Error(SessionError::Rejected { reply_to: id, message, error })
            },
        };

        Ok(vec![SessionAction::Broadcast(signal)])
    }

    fn handle_push(&self, frame: &PushFrame) -> Result<Vec<SessionAction>, DecodeError> {
        let Some(kind) = frame.kind() else {
            tracing::trace!("ignoring untagged push frame");
            return Ok(Vec::new());
        };

        let step = self.handshake.lock().observe(kind);

        match step {
            HandshakeStep::Established => {
                tracing::info!("session established");
                Ok(vec![SessionAction::Broadcast(Signal::LoginComplete)])
            },
            HandshakeStep::Rejected => {
                let error = handshake_error(kind, frame);
                tracing::warn!(%error, "handshake failed");
                let reason = error.to_string();
                Ok(vec![
                    SessionAction::Broadcast(Signal::Error(error)),
                    SessionAction::Close { reason },
                ])
            },
            HandshakeStep::Dropped => {
                tracing::debug!(kind, "dropping push frame received after close");
                Ok(Vec::new())
            },
            HandshakeStep::PassThrough => Ok(match classify(frame, &self.directory)? {
                Classified::Notification(notification) => {
                    vec![SessionAction::Broadcast(Signal::Event(notification))]
                },
                Classified::Error(error) => {
                    tracing::warn!(%error, "server reported an error");
                    vec![SessionAction::Broadcast(Signal::Error(SessionError::Remote(error)))]
                },
                Classified::Ignored => Vec::new(),
            }),
        }
    }
}

/// Error for a first push frame that was not `hello`.
///
/// Uses the server's error details when the frame is a well-formed error
/// frame, otherwise names the unexpected tag.
fn handshake_error(kind: &str, frame: &PushFrame) -> SessionError {
    let remote = if kind == ERROR_TYPE {
        RemoteError::from_frame(frame.value()).ok().flatten()
    } else {
        None
    };

    match remote {
        Some(remote) => SessionError::HandshakeRejected(remote),
        None => SessionError::HandshakeFailed { kind: kind.to_string() },
    }
}
