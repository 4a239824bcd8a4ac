//! Read-only user and channel directory.
//!
//! Populated once from the session snapshot and never mutated afterwards, so
//! lookups need no locking. Names are matched case-insensitively, ids
//! exactly. A miss is `None`, never an error.

use std::collections::HashMap;

use huddle_proto::{Channel, ObjectId, SessionSnapshot, User};
use serde_json::Value;

/// Snapshot of the workspace's users and channels.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    self_id: Option<ObjectId>,
    users: HashMap<ObjectId, User>,
    user_names: HashMap<String, ObjectId>,
    channels: HashMap<ObjectId, Channel>,
    channel_names: HashMap<String, ObjectId>,
}

impl Directory {
    /// Build the directory from a session snapshot.
    ///
    /// Records that fail to decode are skipped and logged.
    pub fn load(snapshot: &SessionSnapshot) -> Self {
        let users = decode_all(&snapshot.users, "user", User::decode);
        let channels = decode_all(&snapshot.channels, "channel", Channel::decode);

        let directory = Self::from_records(snapshot.self_id.clone(), users, channels);

        tracing::debug!(
            users = directory.users.len(),
            channels = directory.channels.len(),
            "directory loaded"
        );

        if directory.self_user().is_none() {
            tracing::warn!(self_id = %snapshot.self_id, "session user missing from user list");
        }

        directory
    }

    /// Build the directory from already decoded records.
    pub fn from_records(
        self_id: ObjectId,
        users: impl IntoIterator<Item = User>,
        channels: impl IntoIterator<Item = Channel>,
    ) -> Self {
        let mut directory = Self { self_id: Some(self_id), ..Self::default() };

        for user in users {
            directory.user_names.insert(user.name.to_lowercase(), user.id.clone());
            directory.users.insert(user.id.clone(), user);
        }

        for channel in channels {
            if let Some(name) = &channel.name {
                directory.channel_names.insert(name.to_lowercase(), channel.id.clone());
            }
            directory.channels.insert(channel.id.clone(), channel);
        }

        directory
    }

    /// Id of the authenticated user.
    pub fn self_id(&self) -> Option<&ObjectId> {
        self.self_id.as_ref()
    }

    /// Record of the authenticated user, if the snapshot listed it.
    pub fn self_user(&self) -> Option<&User> {
        self.self_id.as_ref().and_then(|id| self.user_by_id(id))
    }

    /// Look up a user by name, ignoring case.
    pub fn user(&self, name: &str) -> Option<&User> {
        self.user_names.get(&name.to_lowercase()).and_then(|id| self.users.get(id))
    }

    /// Look up a user by id.
    pub fn user_by_id(&self, id: &ObjectId) -> Option<&User> {
        self.users.get(id)
    }

    /// Look up a channel by name, ignoring case.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channel_names.get(&name.to_lowercase()).and_then(|id| self.channels.get(id))
    }

    /// Look up a channel by id.
    pub fn channel_by_id(&self, id: &ObjectId) -> Option<&Channel> {
        self.channels.get(id)
    }

    /// All users, in no particular order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// All channels, in no particular order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }
}

fn decode_all<T, E: std::fmt::Display>(
    records: &[Value],
    kind: &'static str,
    decode: impl Fn(&Value) -> Result<T, E>,
) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match decode(record) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                tracing::warn!(kind, %error, %record, "skipping unloadable directory record");
                None
            },
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot::decode(&json!({
            "self": { "id": "U1" },
            "url": "ws://localhost",
            "users": [
                { "id": "U1", "name": "Alice" },
                { "id": "U2", "name": "bob" },
                { "id": "U3" },
                "garbage"
            ],
            "channels": [
                { "id": "C1", "name": "General" },
                { "id": "D1", "is_im": true },
                { "name": "no-id" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn name_lookup_ignores_case() {
        let directory = Directory::load(&snapshot());
        let lower = directory.user("alice").unwrap();
        let upper = directory.user("ALICE").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.id, ObjectId::new("U1"));

        assert_eq!(directory.channel("general").map(|c| &c.id), Some(&ObjectId::new("C1")));
    }

    #[test]
    fn id_lookup_is_exact() {
        let directory = Directory::load(&snapshot());
        assert!(directory.user_by_id(&ObjectId::new("U2")).is_some());
        assert!(directory.user_by_id(&ObjectId::new("u2")).is_none());
    }

    #[test]
    fn unknown_keys_are_absent() {
        let directory = Directory::load(&snapshot());
        assert!(directory.user("nobody").is_none());
        assert!(directory.user_by_id(&ObjectId::new("U404")).is_none());
        assert!(directory.channel("random").is_none());
        assert!(directory.channel_by_id(&ObjectId::new("C404")).is_none());
    }

    #[test]
    fn bad_records_are_skipped() {
        let directory = Directory::load(&snapshot());
        assert_eq!(directory.users().count(), 2);
        assert_eq!(directory.channels().count(), 2);
    }

    #[test]
    fn unnamed_channels_are_reachable_by_id_only() {
        let directory = Directory::load(&snapshot());
        assert!(directory.channel_by_id(&ObjectId::new("D1")).is_some());
    }

    #[test]
    fn self_user_resolved() {
        let directory = Directory::load(&snapshot());
        assert_eq!(directory.self_id(), Some(&ObjectId::new("U1")));
        assert_eq!(directory.self_user().map(|u| u.name.as_str()), Some("Alice"));
    }
}
