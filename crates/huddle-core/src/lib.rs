//! Huddle session core
//!
//! Sans-IO logic for a real-time session: login handshake, request/reply
//! correlation, push event classification and observer fan-out.
//!
//! # Architecture
//!
//! [`SessionCore`] takes inbound frame text and returns [`SessionAction`]s
//! (broadcast a [`Signal`], close the transport) for a driver to execute. It
//! owns no sockets and spawns nothing, so every behavior is testable by
//! feeding strings. All state is behind locks: the frame-processing context
//! and arbitrary caller threads may use one core concurrently.
//!
//! # Components
//!
//! - [`Directory`]: Read-only user/channel lookup loaded from the snapshot
//! - [`Correlator`]: Outbound id counter and pending-request table
//! - [`Handshake`]: Gate that requires `hello` before any other push frame
//! - [`classify`]: Push frame to [`Notification`]
//! - [`Dispatcher`]: Ordered, panic-isolated broadcast to [`Listener`]s
//! - [`SessionCore`]: Composition of the above

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod classifier;
mod correlator;
mod directory;
mod dispatch;
mod error;
mod handshake;
mod session;

pub use classifier::{Classified, MessageEvent, Notification, SentEvent, classify};
pub use correlator::{Correlator, Resolution};
pub use directory::Directory;
pub use dispatch::{Dispatcher, Listener, ListenerId, Signal};
pub use error::SessionError;
pub use handshake::{Handshake, HandshakeStep, SessionState};
pub use huddle_proto as proto;
pub use session::{SessionAction, SessionCore};
