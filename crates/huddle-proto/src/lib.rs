//! Huddle wire protocol.
//!
//! JSON text frames exchanged over a real-time session. Every entity has a
//! hand-written codec that validates the fields it needs and reports a
//! [`DecodeError`] naming the entity and field on violation, instead of
//! falling back to defaults.
//!
//! # Frame routing
//!
//! An inbound frame is either a reply to one of our requests (it carries `ok`
//! or `reply_to`) or a push event tagged by `type`. [`InboundFrame::parse`]
//! makes that split; [`Event::decode`] then maps a push frame onto the closed
//! set of event kinds, with [`Event::Unrecognized`] as the fallback so new
//! server tags never break older clients.
//!
//! # Components
//!
//! - [`ObjectId`]: Opaque string identifier for users, channels and messages
//! - [`User`], [`Channel`], [`SessionSnapshot`]: Session-open payload
//! - [`Message`], [`MessageSubtype`]: Inbound chat messages
//! - [`Attachment`]: Rich message attachments
//! - [`OutboundMessage`]: Requests to post into a channel
//! - [`InboundFrame`], [`Reply`], [`PushFrame`], [`Event`]: Inbound routing

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod attachment;
mod error;
mod event;
mod frame;
mod id;
mod json;
mod message;
mod outbound;
mod records;
mod snapshot;

pub use attachment::{Attachment, AttachmentField};
pub use error::{DecodeError, FrameError, RemoteError};
pub use event::{Event, LifecycleEvent, LifecycleKind};
pub use frame::{InboundFrame, PushFrame, Reply};
pub use id::ObjectId;
pub use message::{Edit, Message, MessageSubtype};
pub use outbound::OutboundMessage;
pub use records::{Channel, User};
pub use snapshot::SessionSnapshot;

/// Type tag of the handshake-success frame.
pub const HELLO_TYPE: &str = "hello";

/// Type tag of chat message frames, inbound and outbound.
pub const MESSAGE_TYPE: &str = "message";

/// Type tag of server error frames.
pub const ERROR_TYPE: &str = "error";
