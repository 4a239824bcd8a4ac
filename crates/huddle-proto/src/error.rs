//! Error types for the wire layer.
//!
//! Two failure classes with different blast radius: a [`FrameError`] means
//! the text could not be read as a JSON object at all, while a
//! [`DecodeError`] means a recognized frame was missing or mistyped a field
//! it needs. Neither is fatal to a session; callers drop the frame.
//!
//! [`RemoteError`] is not a local failure. It is the `{code, msg}` object the
//! far end sends when it rejects a request or the handshake.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::json;

/// A recognized entity had a missing or malformed field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Required field absent (or `null`)
    #[error("{entity}: missing required field `{field}`")]
    MissingField {
        /// Entity being decoded
        entity: &'static str,
        /// Field that was absent
        field: &'static str,
    },

    /// Field present but of the wrong JSON type
    #[error("{entity}: field `{field}` must be {expected}")]
    InvalidField {
        /// Entity being decoded
        entity: &'static str,
        /// Offending field
        field: &'static str,
        /// Expected JSON shape
        expected: &'static str,
    },

    /// Entity itself was not a JSON object
    #[error("{entity}: expected a JSON object")]
    NotAnObject {
        /// Entity being decoded
        entity: &'static str,
    },
}

/// Frame text could not be read as a JSON object.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Not valid JSON
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but the root is not an object
    #[error("malformed frame: root is not a JSON object")]
    NotAnObject,
}

/// Error reported by the far end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Server error code
    pub code: i64,
    /// Server error message
    pub msg: String,
}

impl RemoteError {
    /// Create a remote error from its parts.
    pub fn new(code: i64, msg: impl Into<String>) -> Self {
        Self { code, msg: msg.into() }
    }

    /// Read the `error` object embedded in a frame, if there is one.
    ///
    /// Returns `Ok(None)` when the frame has no `error` field.
    pub fn from_frame(frame: &Value) -> Result<Option<Self>, DecodeError> {
        match frame.get("error") {
            None | Some(Value::Null) => Ok(None),
            Some(error) => Self::decode(error).map(Some),
        }
    }

    /// Decode an `{code, msg}` object.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "error";
        let object = json::object(value, ENTITY)?;
        let code = json::required_i64(object, ENTITY, "code")?;
        let msg = json::required_str(object, ENTITY, "msg")?;
        Ok(Self { code, msg: msg.to_string() })
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote error {}: {}", self.code, self.msg)
    }
}

impl std::error::Error for RemoteError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn remote_error_from_frame() {
        let frame = json!({ "type": "error", "error": { "code": 1, "msg": "not_authed" } });
        let error = RemoteError::from_frame(&frame).unwrap();
        assert_eq!(error, Some(RemoteError::new(1, "not_authed")));
    }

    #[test]
    fn remote_error_absent() {
        let frame = json!({ "type": "error" });
        assert_eq!(RemoteError::from_frame(&frame).unwrap(), None);
    }

    #[test]
    fn remote_error_missing_msg() {
        let frame = json!({ "error": { "code": 2 } });
        let result = RemoteError::from_frame(&frame);
        assert_eq!(
            result,
            Err(DecodeError::MissingField { entity: "error", field: "msg" })
        );
    }

    #[test]
    fn remote_error_display() {
        let error = RemoteError::new(4, "rate_limited");
        assert_eq!(error.to_string(), "remote error 4: rate_limited");
    }
}
