//! Session composition root.
//!
//! [`Session`] owns a [`SessionCore`], a [`Transport`] and a [`Dispatcher`].
//! One background task feeds inbound frames to the core strictly in arrival
//! order and executes the returned actions; a frame's broadcast finishes
//! before the next frame is read. Callers on any thread may send, register
//! listeners or close concurrently.
//!
//! Listeners run on the frame-processing task. A listener that blocks stalls
//! every later frame of its session.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use huddle_core::{
    Directory, Dispatcher, Listener, ListenerId, SessionAction, SessionCore, SessionState, Signal,
};
use huddle_proto::{ObjectId, OutboundMessage, SessionSnapshot, User};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{ClientError, ConnectError, SessionConfig, Transport, TransportEvent, WebSocketTransport};

/// A live real-time session.
///
/// Cheap to clone; all clones drive the same connection.
pub struct Session<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("open", &self.is_open())
            .field("pending", &self.pending_count())
            .finish()
    }
}

struct Shared<T> {
    core: SessionCore,
    transport: T,
    dispatcher: Dispatcher,
    closed_announced: AtomicBool,
}

impl Session<WebSocketTransport> {
    /// Open a session from a snapshot payload.
    ///
    /// Loads the directory from `payload`, then connects to the endpoint it
    /// names within `config.connect_timeout`. `listeners` are registered
    /// before the first frame is read, so none of them can miss the
    /// handshake.
    pub async fn connect(
        payload: &Value,
        config: &SessionConfig,
        listeners: impl IntoIterator<Item = Arc<dyn Listener>>,
    ) -> Result<Self, ConnectError> {
        let snapshot = SessionSnapshot::decode(payload)?;
        let core = SessionCore::from_snapshot(&snapshot);

        tracing::info!(url = %snapshot.url, self_id = %snapshot.self_id, "connecting");
        let (transport, events) =
            WebSocketTransport::connect(&snapshot.url, config.connect_timeout).await?;

        Ok(Self::with_transport(core, transport, events, listeners))
    }
}

impl<T: Transport> Session<T> {
    /// Run a session over an already open transport.
    ///
    /// Spawns the frame-processing task; must be called within a Tokio
    /// runtime.
    pub fn with_transport(
        core: SessionCore,
        transport: T,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        listeners: impl IntoIterator<Item = Arc<dyn Listener>>,
    ) -> Self {
        let dispatcher = Dispatcher::new();
        for listener in listeners {
            dispatcher.register(listener);
        }

        let shared = Arc::new(Shared {
            core,
            transport,
            dispatcher,
            closed_announced: AtomicBool::new(false),
        });

        tokio::spawn(process_events(Arc::clone(&shared), events));

        Self { shared }
    }

    /// Send `message`, returning its correlation id.
    ///
    /// Returns as soon as the frame is queued. The outcome arrives later as a
    /// sent notification or a rejection error.
    pub fn send_message(&self, message: OutboundMessage) -> Result<u64, ClientError> {
        if !self.is_open() || self.state() == SessionState::Closed {
            return Err(ClientError::Closed);
        }

        let (id, frame) = self.shared.core.prepare_message(message)?;

        if let Err(error) = self.shared.transport.send_text(frame) {
            self.shared.core.abandon_message(id);
            return Err(error.into());
        }

        tracing::debug!(id, "message queued");
        Ok(id)
    }

    /// Send a plain text message into `channel`.
    pub fn send_text(
        &self,
        text: impl Into<String>,
        channel: impl Into<ObjectId>,
    ) -> Result<u64, ClientError> {
        self.send_message(OutboundMessage::new(channel, text))
    }

    /// Whether the transport is running.
    pub fn is_open(&self) -> bool {
        self.shared.transport.is_running()
    }

    /// Close the session.
    ///
    /// Idempotent and safe from inside a listener. Pending requests are left
    /// unresolved. Listeners receive [`Signal::Closed`] once.
    pub fn close(&self) {
        self.shared.finish();
    }

    /// Add a listener after all current ones.
    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        self.shared.dispatcher.register(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.shared.dispatcher.unregister(id)
    }

    /// Handshake state.
    pub fn state(&self) -> SessionState {
        self.shared.core.state()
    }

    /// User and channel directory.
    pub fn directory(&self) -> &Directory {
        self.shared.core.directory()
    }

    /// The authenticated user.
    pub fn self_user(&self) -> Option<&User> {
        self.shared.core.self_user()
    }

    /// Number of sent messages awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.shared.core.pending_count()
    }
}

impl<T: Transport> Shared<T> {
    fn handle_text(&self, text: &str) {
        let actions = match self.core.handle_text(text) {
            Ok(actions) => actions,
            Err(error) => {
                tracing::warn!(%error, frame = text, "dropping malformed frame");
                return;
            },
        };

        for action in actions {
            match action {
                SessionAction::Broadcast(signal) => self.dispatcher.broadcast(&signal),
                SessionAction::Close { reason } => {
                    tracing::info!(%reason, "closing session");
                    self.finish();
                },
            }
        }
    }

    fn finish(&self) {
        self.core.close();
        self.transport.stop();

        if !self.closed_announced.swap(true, Ordering::AcqRel) {
            tracing::info!("session closed");
            self.dispatcher.broadcast(&Signal::Closed);
        }
    }
}

async fn process_events<T: Transport>(
    shared: Arc<Shared<T>>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Text(text) => shared.handle_text(&text),
            TransportEvent::Closed { code, reason } => {
                tracing::info!(?code, %reason, "transport closed");
                break;
            },
        }
    }

    shared.finish();
}
