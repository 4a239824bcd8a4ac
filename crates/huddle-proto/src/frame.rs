//! Inbound frame routing.
//!
//! Every inbound text frame is a JSON object. Frames carrying `ok` or
//! `reply_to` answer one of our requests and are routed to the correlator;
//! everything else is a server push identified by its `type` tag.

use serde_json::Value;

use crate::{DecodeError, FrameError, RemoteError, json};

/// A parsed inbound frame, split by routing path.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Reply to an outbound request (undecoded, see [`Reply::decode`])
    Reply(Value),
    /// Server-initiated event
    Push(PushFrame),
}

impl InboundFrame {
    /// Parse frame text and pick its routing path.
    ///
    /// Fails only when the text is not a JSON object. Field-level problems
    /// surface later, when the routed frame is decoded.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(FrameError::NotAnObject)?;

        if object.contains_key("ok") || object.contains_key("reply_to") {
            Ok(Self::Reply(value))
        } else {
            Ok(Self::Push(PushFrame(value)))
        }
    }
}

/// Acknowledgement of an outbound request.
///
/// Shape: `{ ok, reply_to, error?: {code, msg}, ts? }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Correlation id of the request being answered
    pub reply_to: u64,
    /// Whether the far end accepted the request
    pub ok: bool,
    /// Rejection details
    pub error: Option<RemoteError>,
    /// Server timestamp assigned to an accepted message
    pub ts: Option<String>,
}

impl Reply {
    /// Decode a reply frame.
    ///
    /// `reply_to` is required. A missing `ok` reads as success: the server
    /// echoes the last message of a previous connection as a `message` frame
    /// with `reply_to` and no `ok`.
    ///
    /// Only `reply_to` and `ok` are strict. A malformed `error` body or a
    /// non-string `ts` reads as absent so the request can still be matched;
    /// [`Reply::error_fault`] reports what was wrong with the body.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "reply";
        let object = json::object(value, ENTITY)?;

        let reply_to = json::optional_u64(object, ENTITY, "reply_to")?
            .ok_or(DecodeError::MissingField { entity: ENTITY, field: "reply_to" })?;

        Ok(Self {
            reply_to,
            ok: json::bool_or(object, ENTITY, "ok", true)?,
            error: RemoteError::from_frame(value).ok().flatten(),
            ts: object.get("ts").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Why the `error` body of a reply frame could not be decoded.
    ///
    /// `None` when the body is absent or well formed.
    pub fn error_fault(value: &Value) -> Option<DecodeError> {
        RemoteError::from_frame(value).err()
    }
}

/// Server push frame, tagged by `type`.
#[derive(Debug, Clone, PartialEq)]
pub struct PushFrame(Value);

impl PushFrame {
    /// Wrap a JSON value as a push frame.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `type` tag. `None` when absent or not a string.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Raw frame body.
    pub fn value(&self) -> &Value {
        &self.0
    }
}
