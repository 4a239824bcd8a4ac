//! Session-open payload.

use serde_json::Value;

use crate::{DecodeError, ObjectId, json};

/// One-time payload that opens a real-time session.
///
/// Shape: `{ self: {id}, users: [...], channels: [...], url }`.
///
/// User and channel records are kept undecoded so that one bad record can be
/// skipped by the directory without failing the whole snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Id of the authenticated user
    pub self_id: ObjectId,
    /// Socket endpoint to connect to
    pub url: String,
    /// Raw user records
    pub users: Vec<Value>,
    /// Raw channel records
    pub channels: Vec<Value>,
}

impl SessionSnapshot {
    /// Decode a snapshot. `self.id` and `url` are required.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "snapshot";
        let object = json::object(value, ENTITY)?;

        let me = json::optional_object(object, ENTITY, "self")?
            .ok_or(DecodeError::MissingField { entity: ENTITY, field: "self" })?;
        let self_id = json::required_str(me, "self", "id")?;

        let list = |field: &'static str| -> Result<Vec<Value>, DecodeError> {
            Ok(json::optional_array(object, ENTITY, field)?.cloned().unwrap_or_default())
        };

        Ok(Self {
            self_id: ObjectId::new(self_id),
            url: json::required_str(object, ENTITY, "url")?.to_string(),
            users: list("users")?,
            channels: list("channels")?,
        })
    }
}
