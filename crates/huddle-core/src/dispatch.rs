//! Listener registry and broadcast.
//!
//! Broadcast delivers on the calling thread, in registration order, to a
//! snapshot of the registry taken when the broadcast starts. The registry
//! lock is not held while listeners run, so a listener may register,
//! unregister or trigger a nested broadcast from inside its callback:
//!
//! - a listener removed mid-broadcast still receives the current signal
//! - a listener added mid-broadcast receives only later signals
//!
//! A panicking listener is logged and skipped; the rest still receive the
//! signal.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{Notification, SessionError};

/// Signal delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Handshake completed
    LoginComplete,
    /// Session closed
    Closed,
    /// Protocol or remote fault
    Error(SessionError),
    /// Domain notification
    Event(Notification),
}

/// Observer of session signals.
///
/// Called synchronously on the frame-processing context. Long-running work
/// should be handed off elsewhere; the next frame waits until every listener
/// returns.
pub trait Listener: Send + Sync {
    /// Handle one signal.
    fn on_signal(&self, signal: &Signal);
}

impl<F> Listener for F
where
    F: Fn(&Signal) + Send + Sync,
{
    fn on_signal(&self, signal: &Signal) {
        self(signal);
    }
}

/// Handle returned by [`Dispatcher::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Thread-safe listener registry with ordered broadcast.
#[derive(Default)]
pub struct Dispatcher {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn Listener>)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("listeners", &self.len()).finish()
    }
}

impl Dispatcher {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener after all current ones.
    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `signal` to every registered listener, in registration order.
    pub fn broadcast(&self, signal: &Signal) {
        let snapshot: Vec<(ListenerId, Arc<dyn Listener>)> = self.listeners.lock().clone();

        for (id, listener) in snapshot {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| listener.on_signal(signal)));
            if delivered.is_err() {
                tracing::error!(listener = id.0, ?signal, "listener panicked during broadcast");
            }
        }
    }
}
