//! Push event classification.
//!
//! Turns a push frame into a [`Notification`], resolving the acting user of
//! message events through the [`Directory`]. A directory miss leaves the user
//! as `None`; it is not an error.

use huddle_proto::{
    DecodeError, Event, LifecycleEvent, Message, MessageSubtype, OutboundMessage, PushFrame,
    RemoteError, User,
};

use crate::Directory;

/// A message posted, edited or deleted by someone.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// Acting user: the editor for edits, the author otherwise
    pub user: Option<User>,
    /// The message
    pub message: Message,
}

impl MessageEvent {
    /// Kind of message event.
    pub fn subtype(&self) -> MessageSubtype {
        self.message.subtype
    }
}

/// Our own message, acknowledged by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SentEvent {
    /// Correlation id the message was sent with
    pub id: u64,
    /// The message as submitted
    pub message: OutboundMessage,
    /// The session user
    pub user: Option<User>,
    /// Server timestamp assigned to the message
    pub ts: Option<String>,
}

impl SentEvent {
    /// Always [`MessageSubtype::Sent`].
    pub fn subtype(&self) -> MessageSubtype {
        MessageSubtype::Sent
    }
}

/// Domain notification delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Message posted, edited or deleted
    Message(MessageEvent),
    /// Our message was accepted
    Sent(SentEvent),
    /// Channel, group, user or team change
    Lifecycle(LifecycleEvent),
}

/// Result of classifying one push frame.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)] // consumed immediately by the session
pub enum Classified {
    /// Deliver to listeners
    Notification(Notification),
    /// Server-reported error
    Error(RemoteError),
    /// Nothing to deliver
    Ignored,
}

/// Classify a push frame received after the handshake.
///
/// Untagged frames, unrecognized tags and repeated `hello` frames are
/// [`Classified::Ignored`]. A recognized frame with bad content is a
/// [`DecodeError`].
pub fn classify(frame: &PushFrame, directory: &Directory) -> Result<Classified, DecodeError> {
    let Some(event) = Event::decode(frame)? else {
        return Ok(Classified::Ignored);
    };

    Ok(match event {
        Event::Message(message) => {
            let user = message.actor().and_then(|id| directory.user_by_id(id)).cloned();
            Classified::Notification(Notification::Message(MessageEvent { user, message }))
        },
        Event::Lifecycle(event) => Classified::Notification(Notification::Lifecycle(event)),
        Event::Error(error) => Classified::Error(error),
        Event::Hello => Classified::Ignored,
        Event::Unrecognized(kind) => {
            tracing::trace!(%kind, "ignoring unrecognized event");
            Classified::Ignored
        },
    })
}
