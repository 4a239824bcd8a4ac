//! Huddle client
//!
//! Drives a [`huddle_core::SessionCore`] over a live connection. The core
//! decides; this crate moves text frames between the socket and the core and
//! executes the resulting actions.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use huddle_client::{Session, SessionConfig};
//! use huddle_core::{Listener, Signal};
//!
//! # async fn run(payload: serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
//! let logger: Arc<dyn Listener> = Arc::new(|signal: &Signal| tracing::info!(?signal));
//! let session = Session::connect(&payload, &SessionConfig::default(), [logger]).await?;
//!
//! if let Some(general) = session.directory().channel("general") {
//!     session.send_text("hello", general.id.clone())?;
//! }
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`Transport`]: Text-frame transport seen by the session
//! - [`WebSocketTransport`]: tokio-tungstenite implementation
//! - [`Session`]: Composition root and public entry point
//! - [`SessionConfig`]: Connect-time settings

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod session;
pub mod transport;

pub use config::{DEFAULT_CONNECT_TIMEOUT, SessionConfig};
pub use error::{ClientError, ConnectError, TransportError};
pub use session::Session;
pub use transport::{Transport, TransportEvent, WebSocketTransport};
