//! Push event kinds.
//!
//! One decode path per `type` tag. Tags this crate does not know decode to
//! [`Event::Unrecognized`] so newer servers never break older clients.

use crate::{
    DecodeError, ERROR_TYPE, HELLO_TYPE, MESSAGE_TYPE, Message, ObjectId, PushFrame,
    RemoteError, json,
};

/// Channel, group, user and team lifecycle tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// `channel_created`
    ChannelCreated,
    /// `channel_joined`
    ChannelJoined,
    /// `channel_left`
    ChannelLeft,
    /// `channel_rename`
    ChannelRename,
    /// `channel_archive`
    ChannelArchive,
    /// `channel_unarchive`
    ChannelUnarchive,
    /// `channel_history_changed`
    ChannelHistoryChanged,
    /// `group_joined`
    GroupJoined,
    /// `group_left`
    GroupLeft,
    /// `group_open`
    GroupOpen,
    /// `group_close`
    GroupClose,
    /// `group_archive`
    GroupArchive,
    /// `group_unarchive`
    GroupUnarchive,
    /// `group_rename`
    GroupRename,
    /// `group_history_changed`
    GroupHistoryChanged,
    /// `user_change`
    UserChange,
    /// `team_join`
    TeamJoin,
}

impl LifecycleKind {
    /// Map a `type` tag. `None` for tags outside this set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "channel_created" => Self::ChannelCreated,
            "channel_joined" => Self::ChannelJoined,
            "channel_left" => Self::ChannelLeft,
            "channel_rename" => Self::ChannelRename,
            "channel_archive" => Self::ChannelArchive,
            "channel_unarchive" => Self::ChannelUnarchive,
            "channel_history_changed" => Self::ChannelHistoryChanged,
            "group_joined" => Self::GroupJoined,
            "group_left" => Self::GroupLeft,
            "group_open" => Self::GroupOpen,
            "group_close" => Self::GroupClose,
            "group_archive" => Self::GroupArchive,
            "group_unarchive" => Self::GroupUnarchive,
            "group_rename" => Self::GroupRename,
            "group_history_changed" => Self::GroupHistoryChanged,
            "user_change" => Self::UserChange,
            "team_join" => Self::TeamJoin,
            _ => return None,
        })
    }
}

/// A lifecycle notification.
///
/// Carries the tag plus whatever channel and user ids the frame names. Both
/// may arrive inline (`"C1"`) or as an object with an `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Which lifecycle change happened
    pub kind: LifecycleKind,
    /// Channel or group concerned
    pub channel: Option<ObjectId>,
    /// User concerned
    pub user: Option<ObjectId>,
}

/// A decoded push frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Handshake success
    Hello,
    /// Message posted, edited or deleted
    Message(Message),
    /// Channel, group, user or team change
    Lifecycle(LifecycleEvent),
    /// Server-reported error
    Error(RemoteError),
    /// Tag not known to this client
    Unrecognized(String),
}

impl Event {
    /// Decode a push frame.
    ///
    /// Returns `Ok(None)` for frames without a usable `type` tag.
    pub fn decode(frame: &PushFrame) -> Result<Option<Self>, DecodeError> {
        let Some(kind) = frame.kind() else {
            return Ok(None);
        };

        let event = match kind {
            HELLO_TYPE => Self::Hello,
            MESSAGE_TYPE => Self::Message(Message::decode(frame.value())?),
            ERROR_TYPE => Self::Error(decode_error(frame)?),
            other => match LifecycleKind::from_tag(other) {
                Some(kind) => Self::Lifecycle(decode_lifecycle(kind, frame)),
                None => Self::Unrecognized(other.to_string()),
            },
        };

        Ok(Some(event))
    }
}

fn decode_error(frame: &PushFrame) -> Result<RemoteError, DecodeError> {
    RemoteError::from_frame(frame.value())?
        .ok_or(DecodeError::MissingField { entity: ERROR_TYPE, field: "error" })
}

fn decode_lifecycle(kind: LifecycleKind, frame: &PushFrame) -> LifecycleEvent {
    let object = frame.value().as_object();
    let id_of = |field: &str| object.and_then(|o| json::loose_id(o, field)).map(ObjectId::new);

    LifecycleEvent { kind, channel: id_of("channel"), user: id_of("user") }
}
