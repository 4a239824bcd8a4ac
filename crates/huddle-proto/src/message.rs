//! Inbound chat messages.

use serde_json::Value;

use crate::{Attachment, DecodeError, ObjectId, json};

/// Kind of a message, from its `subtype` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSubtype {
    /// Plain user message (no subtype)
    Normal,
    /// Our own message, acknowledged by the server
    Sent,
    /// Posted by an integration
    FromBot,
    /// `/me` message
    MeMessage,
    /// An earlier message was edited
    Edit,
    /// An earlier message was deleted
    Delete,
    /// Member joined a channel
    ChannelJoin,
    /// Member left a channel
    ChannelLeave,
    /// Channel topic changed
    ChannelTopic,
    /// Channel purpose changed
    ChannelPurpose,
    /// Channel renamed
    ChannelName,
    /// Channel archived
    ChannelArchive,
    /// Channel unarchived
    ChannelUnarchive,
    /// Member joined a group
    GroupJoin,
    /// Member left a group
    GroupLeave,
    /// Group topic changed
    GroupTopic,
    /// Group purpose changed
    GroupPurpose,
    /// Group renamed
    GroupName,
    /// Group archived
    GroupArchive,
    /// Group unarchived
    GroupUnarchive,
    /// File shared into the conversation
    FileShare,
    /// Comment on a shared file
    FileComment,
    /// File mentioned
    FileMention,
}

impl MessageSubtype {
    /// Map a wire `subtype` tag. Absent and unknown tags are [`Self::Normal`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("bot_message") => Self::FromBot,
            Some("me_message") => Self::MeMessage,
            Some("message_changed") => Self::Edit,
            Some("message_deleted") => Self::Delete,
            Some("channel_join") => Self::ChannelJoin,
            Some("channel_leave") => Self::ChannelLeave,
            Some("channel_topic") => Self::ChannelTopic,
            Some("channel_purpose") => Self::ChannelPurpose,
            Some("channel_name") => Self::ChannelName,
            Some("channel_archive") => Self::ChannelArchive,
            Some("channel_unarchive") => Self::ChannelUnarchive,
            Some("group_join") => Self::GroupJoin,
            Some("group_leave") => Self::GroupLeave,
            Some("group_topic") => Self::GroupTopic,
            Some("group_purpose") => Self::GroupPurpose,
            Some("group_name") => Self::GroupName,
            Some("group_archive") => Self::GroupArchive,
            Some("group_unarchive") => Self::GroupUnarchive,
            Some("file_share") => Self::FileShare,
            Some("file_comment") => Self::FileComment,
            Some("file_mention") => Self::FileMention,
            _ => Self::Normal,
        }
    }

    /// Wire tag. `None` for [`Self::Normal`] and [`Self::Sent`].
    pub fn tag(self) -> Option<&'static str> {
        Some(match self {
            Self::Normal | Self::Sent => return None,
            Self::FromBot => "bot_message",
            Self::MeMessage => "me_message",
            Self::Edit => "message_changed",
            Self::Delete => "message_deleted",
            Self::ChannelJoin => "channel_join",
            Self::ChannelLeave => "channel_leave",
            Self::ChannelTopic => "channel_topic",
            Self::ChannelPurpose => "channel_purpose",
            Self::ChannelName => "channel_name",
            Self::ChannelArchive => "channel_archive",
            Self::ChannelUnarchive => "channel_unarchive",
            Self::GroupJoin => "group_join",
            Self::GroupLeave => "group_leave",
            Self::GroupTopic => "group_topic",
            Self::GroupPurpose => "group_purpose",
            Self::GroupName => "group_name",
            Self::GroupArchive => "group_archive",
            Self::GroupUnarchive => "group_unarchive",
            Self::FileShare => "file_share",
            Self::FileComment => "file_comment",
            Self::FileMention => "file_mention",
        })
    }
}

/// Who edited a message, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Editing user
    pub user: ObjectId,
    /// Edit timestamp, `"secs.micros"`
    pub ts: Option<String>,
}

/// A message pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Kind of message
    pub subtype: MessageSubtype,
    /// Author
    pub user: Option<ObjectId>,
    /// Conversation the message belongs to
    pub channel: Option<ObjectId>,
    /// Message text
    pub text: Option<String>,
    /// Message timestamp, `"secs.micros"`, unique per channel
    pub ts: Option<String>,
    /// Parent message timestamp for threaded replies
    pub thread_ts: Option<String>,
    /// Edit metadata
    pub edited: Option<Edit>,
    /// Attachments, in order
    pub attachments: Vec<Attachment>,
    /// Layout blocks, kept as raw JSON
    pub blocks: Vec<Value>,
    /// Posted as the user rather than as an integration
    pub as_user: bool,
}

impl Message {
    /// Decode a `message` frame.
    ///
    /// For `message_changed` frames the edited content sits in a nested
    /// `message` object; the nested object then supplies the message fields
    /// while the outer frame keeps supplying the channel.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "message";
        let root = json::object(value, ENTITY)?;
        let subtype = MessageSubtype::from_tag(json::optional_str(root, ENTITY, "subtype")?);

        let body = match (subtype, json::optional_object(root, ENTITY, "message")?) {
            (MessageSubtype::Edit, Some(nested)) => nested,
            _ => root,
        };

        let text = |field: &'static str| -> Result<Option<String>, DecodeError> {
            Ok(json::optional_str(body, ENTITY, field)?.map(str::to_string))
        };

        let edited = match json::optional_object(body, ENTITY, "edited")? {
            Some(edited) => Some(Edit {
                user: ObjectId::new(json::required_str(edited, "edited", "user")?),
                ts: json::optional_str(edited, "edited", "ts")?.map(str::to_string),
            }),
            None => None,
        };

        let attachments = match json::optional_array(body, ENTITY, "attachments")? {
            Some(raw) => raw.iter().map(Attachment::decode).collect::<Result<_, _>>()?,
            None => Vec::new(),
        };

        let channel = json::optional_str(root, ENTITY, "channel")?
            .or(json::optional_str(body, ENTITY, "channel")?)
            .map(ObjectId::new);

        Ok(Self {
            subtype,
            user: json::optional_str(body, ENTITY, "user")?.map(ObjectId::new),
            channel,
            text: text("text")?,
            ts: text("ts")?,
            thread_ts: text("thread_ts")?,
            edited,
            attachments,
            blocks: json::optional_array(body, ENTITY, "blocks")?.cloned().unwrap_or_default(),
            as_user: json::bool_or(body, ENTITY, "as_user", true)?,
        })
    }

    /// User whose action this message reports.
    ///
    /// The editor for edits (when known), otherwise the author.
    pub fn actor(&self) -> Option<&ObjectId> {
        match (self.subtype, &self.edited) {
            (MessageSubtype::Edit, Some(edit)) => Some(&edit.user),
            _ => self.user.as_ref(),
        }
    }

    /// Message timestamp in milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> Option<u64> {
        self.ts.as_deref().and_then(ts_to_millis)
    }
}

/// Convert a `"secs.micros"` timestamp to milliseconds.
fn ts_to_millis(ts: &str) -> Option<u64> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, ""));
    let secs: u64 = secs.parse().ok()?;
    let millis = match frac.get(..3) {
        Some(head) => head.parse().ok()?,
        None if frac.is_empty() => 0,
        None => format!("{frac:0<3}").parse().ok()?,
    };
    secs.checked_mul(1000)?.checked_add(millis)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_plain_message() {
        let message = Message::decode(&json!({
            "type": "message",
            "channel": "C1",
            "user": "U2",
            "text": "hello",
            "ts": "1355517523.000005"
        }))
        .unwrap();

        assert_eq!(message.subtype, MessageSubtype::Normal);
        assert_eq!(message.user, Some(ObjectId::new("U2")));
        assert_eq!(message.channel, Some(ObjectId::new("C1")));
        assert_eq!(message.text.as_deref(), Some("hello"));
        assert_eq!(message.timestamp_millis(), Some(1_355_517_523_000));
        assert!(message.as_user);
        assert_eq!(message.actor(), Some(&ObjectId::new("U2")));
    }

    #[test]
    fn edit_actor_is_the_editor() {
        let message = Message::decode(&json!({
            "type": "message",
            "subtype": "message_changed",
            "channel": "C1",
            "user": "U2",
            "edited": { "user": "U3", "ts": "1355517524.000000" }
        }))
        .unwrap();

        assert_eq!(message.subtype, MessageSubtype::Edit);
        assert_eq!(message.actor(), Some(&ObjectId::new("U3")));
    }

    #[test]
    fn nested_edit_body_is_read() {
        let message = Message::decode(&json!({
            "type": "message",
            "subtype": "message_changed",
            "channel": "C1",
            "message": {
                "user": "U2",
                "text": "fixed typo",
                "edited": { "user": "U2", "ts": "1358878755.000001" }
            }
        }))
        .unwrap();

        assert_eq!(message.channel, Some(ObjectId::new("C1")));
        assert_eq!(message.text.as_deref(), Some("fixed typo"));
        assert_eq!(message.actor(), Some(&ObjectId::new("U2")));
    }

    #[test]
    fn edit_without_edited_falls_back_to_author() {
        let message = Message::decode(&json!({
            "type": "message",
            "subtype": "message_changed",
            "user": "U2"
        }))
        .unwrap();
        assert_eq!(message.actor(), Some(&ObjectId::new("U2")));
    }

    #[test]
    fn edited_without_user_is_a_decode_fault() {
        let result = Message::decode(&json!({
            "type": "message",
            "edited": { "ts": "1.0" }
        }));
        assert_eq!(result, Err(DecodeError::MissingField { entity: "edited", field: "user" }));
    }

    #[test]
    fn unknown_subtype_is_normal() {
        assert_eq!(MessageSubtype::from_tag(Some("pinned_item")), MessageSubtype::Normal);
        assert_eq!(MessageSubtype::from_tag(None), MessageSubtype::Normal);
    }

    #[test]
    fn subtype_tags_map_back() {
        for tag in ["bot_message", "message_deleted", "group_topic", "file_mention"] {
            assert_eq!(MessageSubtype::from_tag(Some(tag)).tag(), Some(tag));
        }
        assert_eq!(MessageSubtype::Sent.tag(), None);
    }

    #[test]
    fn attachments_and_blocks_are_kept() {
        let message = Message::decode(&json!({
            "type": "message",
            "attachments": [{ "fallback": "f" }],
            "blocks": [{ "type": "divider" }],
            "as_user": false
        }))
        .unwrap();

        assert_eq!(message.attachments, vec![Attachment::new("f")]);
        assert_eq!(message.blocks, vec![json!({ "type": "divider" })]);
        assert!(!message.as_user);
    }

    #[test]
    fn ts_conversion() {
        assert_eq!(ts_to_millis("12.5"), Some(12_500));
        assert_eq!(ts_to_millis("12"), Some(12_000));
        assert_eq!(ts_to_millis("12.000999"), Some(12_000));
        assert_eq!(ts_to_millis("x.1"), None);
    }
}
