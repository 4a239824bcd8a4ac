//! Directory records: users and channels from the session-open payload.

use serde_json::Value;

use crate::{DecodeError, ObjectId, json};

/// A workspace member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user id
    pub id: ObjectId,
    /// Handle, unique within the workspace (case-insensitive)
    pub name: String,
    /// Display name, if set
    pub real_name: Option<String>,
    /// Whether this account is a bot
    pub is_bot: bool,
    /// Whether the account has been deactivated
    pub deleted: bool,
    /// IANA time zone name, if known
    pub tz: Option<String>,
}

impl User {
    /// Decode a user record. `id` and `name` are required.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "user";
        let object = json::object(value, ENTITY)?;

        Ok(Self {
            id: ObjectId::new(json::required_str(object, ENTITY, "id")?),
            name: json::required_str(object, ENTITY, "name")?.to_string(),
            real_name: json::optional_str(object, ENTITY, "real_name")?.map(str::to_string),
            is_bot: json::bool_or(object, ENTITY, "is_bot", false)?,
            deleted: json::bool_or(object, ENTITY, "deleted", false)?,
            tz: json::optional_str(object, ENTITY, "tz")?.map(str::to_string),
        })
    }
}

/// A conversation: public channel, private group or direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Unique channel id
    pub id: ObjectId,
    /// Channel name. Direct messages have none.
    pub name: Option<String>,
    /// Public channel
    pub is_channel: bool,
    /// Private group
    pub is_group: bool,
    /// Direct message
    pub is_im: bool,
    /// Archived channels accept no new messages
    pub is_archived: bool,
    /// Whether the session user is a member
    pub is_member: bool,
    /// Current topic text
    pub topic: Option<String>,
    /// Current purpose text
    pub purpose: Option<String>,
}

impl Channel {
    /// Decode a channel record. Only `id` is required.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "channel";
        let object = json::object(value, ENTITY)?;

        // Topic and purpose arrive as {value, creator, last_set}
        let text_of = |field: &'static str| -> Result<Option<String>, DecodeError> {
            match json::optional_object(object, ENTITY, field)? {
                Some(inner) => Ok(json::optional_str(inner, ENTITY, "value")?.map(str::to_string)),
                None => Ok(None),
            }
        };

        Ok(Self {
            id: ObjectId::new(json::required_str(object, ENTITY, "id")?),
            name: json::optional_str(object, ENTITY, "name")?.map(str::to_string),
            is_channel: json::bool_or(object, ENTITY, "is_channel", false)?,
            is_group: json::bool_or(object, ENTITY, "is_group", false)?,
            is_im: json::bool_or(object, ENTITY, "is_im", false)?,
            is_archived: json::bool_or(object, ENTITY, "is_archived", false)?,
            is_member: json::bool_or(object, ENTITY, "is_member", false)?,
            topic: text_of("topic")?,
            purpose: text_of("purpose")?,
        })
    }
}
