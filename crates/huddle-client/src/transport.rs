//! Text-frame transport.
//!
//! [`Transport`] is the seam between the session and the socket: send a text
//! frame, report whether the connection is running, stop it. Inbound traffic
//! arrives separately as [`TransportEvent`]s on a channel handed out at
//! connect time. Protocol logic stays in [`huddle_core`].

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message, client::IntoClientRequest},
};

use crate::{ConnectError, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Inbound text frame
    Text(String),
    /// Connection ended; no further events follow
    Closed {
        /// Close code sent by the peer, if any
        code: Option<u16>,
        /// Close reason or error description
        reason: String,
    },
}

/// Outbound side of a text-frame connection.
pub trait Transport: Send + Sync + 'static {
    /// Queue a text frame. Does not wait for it to reach the wire.
    fn send_text(&self, text: String) -> Result<(), TransportError>;

    /// Whether the connection is up.
    fn is_running(&self) -> bool;

    /// Begin closing the connection. Safe to call repeatedly.
    fn stop(&self);
}

enum Outgoing {
    Text(String),
    Close,
}

/// WebSocket connection driven by a background task.
#[derive(Debug)]
pub struct WebSocketTransport {
    outgoing: mpsc::UnboundedSender<Outgoing>,
    running: Arc<AtomicBool>,
}

impl WebSocketTransport {
    /// Open a WebSocket connection to `url`, giving up after `timeout`.
    ///
    /// Returns the transport and the receiver for inbound events. Must be
    /// called within a Tokio runtime.
    pub async fn connect(
        url: &str,
        timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>), ConnectError> {
        let request = url.into_client_request().map_err(|e| ConnectError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let (ws, _response) = tokio::time::timeout(timeout, connect_async(request))
            .await
            .map_err(|_| ConnectError::Timeout(timeout))?
            .map_err(|e| connect_error(url, e))?;

        tracing::debug!(url, "websocket connected");

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));

        tokio::spawn(run_connection(ws, outgoing_rx, events_tx, Arc::clone(&running)));

        Ok((Self { outgoing: outgoing_tx, running }, events_rx))
    }
}

impl Transport for WebSocketTransport {
    fn send_text(&self, text: String) -> Result<(), TransportError> {
        if !self.is_running() {
            return Err(TransportError::Closed);
        }
        self.outgoing.send(Outgoing::Text(text)).map_err(|_| TransportError::Closed)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            let _ = self.outgoing.send(Outgoing::Close);
        }
    }
}

/// Sort a tungstenite connect failure into the fault kinds callers act on.
fn connect_error(url: &str, error: tungstenite::Error) -> ConnectError {
    match error {
        tungstenite::Error::Url(e) => {
            ConnectError::InvalidEndpoint { url: url.to_string(), reason: e.to_string() }
        },
        tungstenite::Error::Io(e) if e.kind() == io::ErrorKind::Interrupted => {
            ConnectError::Interrupted
        },
        tungstenite::Error::Io(e) => ConnectError::Io(e),
        other => ConnectError::Transport(other.to_string()),
    }
}

/// Bridge between the channels and the socket until either side ends.
///
/// Exactly one [`TransportEvent::Closed`] is emitted, after `running` has
/// been cleared.
async fn run_connection(
    ws: WsStream,
    mut outgoing: mpsc::UnboundedReceiver<Outgoing>,
    events: mpsc::UnboundedSender<TransportEvent>,
    running: Arc<AtomicBool>,
) {
    let (mut sink, mut stream) = ws.split();

    let closed = loop {
        tokio::select! {
            command = outgoing.recv() => match command {
                Some(Outgoing::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        tracing::warn!(error = %e, "websocket send failed");
                        break TransportEvent::Closed { code: None, reason: e.to_string() };
                    }
                },
                Some(Outgoing::Close) | None => {
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        tracing::debug!(error = %e, "close frame not delivered");
                    }
                    break TransportEvent::Closed { code: None, reason: "closed locally".into() };
                },
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Text(text.as_str().to_owned())).is_err() {
                        break TransportEvent::Closed { code: None, reason: "receiver dropped".into() };
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    break match frame {
                        Some(frame) => TransportEvent::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.as_str().to_owned(),
                        },
                        None => TransportEvent::Closed { code: None, reason: String::new() },
                    };
                },
                // Ping/pong are answered by tungstenite; binary frames are not part of the protocol
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "websocket receive failed");
                    break TransportEvent::Closed { code: None, reason: e.to_string() };
                },
                None => break TransportEvent::Closed { code: None, reason: "connection ended".into() },
            },
        }
    };

    running.store(false, Ordering::Release);
    tracing::debug!(?closed, "websocket connection finished");
    let _ = events.send(closed);
}
