//! Request/reply correlation.
//!
//! Each submitted message gets the next id from a per-session counter
//! (starting at 1, never reused) and waits in the pending table until a reply
//! naming that id arrives. Replies for ids not in the table are dropped.
//!
//! Entries whose reply never arrives stay in the table until the session is
//! dropped. There is no expiry.

use std::collections::HashMap;

use huddle_proto::{OutboundMessage, RemoteError, Reply};
use parking_lot::Mutex;

/// Outcome of matching a reply to its request.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The far end accepted the message
    Acknowledged {
        /// Correlation id
        id: u64,
        /// The message as submitted
        message: OutboundMessage,
        /// Server timestamp of the posted message
        ts: Option<String>,
    },
    /// The far end rejected the message
    Rejected {
        /// Correlation id
        id: u64,
        /// The message as submitted
        message: OutboundMessage,
        /// Rejection details, if any
        error: Option<RemoteError>,
    },
}

#[derive(Debug)]
struct State {
    next_id: u64,
    pending: HashMap<u64, OutboundMessage>,
}

/// Owner of the outbound id counter and the pending-request table.
#[derive(Debug)]
pub struct Correlator {
    state: Mutex<State>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    /// Create a correlator whose first id is 1.
    pub fn new() -> Self {
        Self { state: Mutex::new(State { next_id: 1, pending: HashMap::new() }) }
    }

    /// Register `message` and return its correlation id.
    pub fn submit(&self, message: OutboundMessage) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        let previous = state.pending.insert(id, message);
        debug_assert!(previous.is_none(), "correlation id {id} reused");

        id
    }

    /// Match a reply to its request and remove the request.
    ///
    /// `None` when no request with that id is pending.
    pub fn resolve(&self, reply: &Reply) -> Option<Resolution> {
        let message = self.state.lock().pending.remove(&reply.reply_to)?;
        let id = reply.reply_to;

        Some(if reply.ok {
            Resolution::Acknowledged { id, message, ts: reply.ts.clone() }
        } else {
            Resolution::Rejected { id, message, error: reply.error.clone() }
        })
    }

    /// Withdraw a request that was never transmitted.
    ///
    /// The id stays consumed.
    pub fn cancel(&self, id: u64) -> Option<OutboundMessage> {
        self.state.lock().pending.remove(&id)
    }

    /// Whether a request with `id` is awaiting its reply.
    pub fn is_pending(&self, id: u64) -> bool {
        self.state.lock().pending.contains_key(&id)
    }

    /// Number of requests awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}
