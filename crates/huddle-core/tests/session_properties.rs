//! Property-based tests for SessionCore
//!
//! Correlation ids, reply matching, handshake gating and directory lookups
//! checked over generated inputs.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use huddle_core::{
    Directory, Notification, SessionAction, SessionCore, SessionError, SessionState, Signal,
    proto::{ObjectId, OutboundMessage, User},
};
use proptest::prelude::*;
use serde_json::json;

fn user(id: &str, name: &str) -> User {
    User {
        id: ObjectId::new(id),
        name: name.to_string(),
        real_name: None,
        is_bot: false,
        deleted: false,
        tz: None,
    }
}

fn established() -> SessionCore {
    let core = SessionCore::new(Directory::from_records(ObjectId::new("U1"), [user("U1", "me")], []));
    let actions = core.handle_text(r#"{"type":"hello"}"#).unwrap();
    assert_eq!(actions, vec![SessionAction::Broadcast(Signal::LoginComplete)]);
    core
}

/// Mixes the case of `name` according to `mask`.
fn recase(name: &str, mask: u64) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| if (mask >> (i % 64)) & 1 == 1 { c.to_ascii_uppercase() } else { c })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: N sends yield ids 1..=N in order
    #[test]
    fn prop_ids_are_sequential(texts in prop::collection::vec(".{0,16}", 1..40)) {
        let core = established();
        for (i, text) in texts.iter().enumerate() {
            let (id, _) = core.prepare_message(OutboundMessage::new("C1", text.clone()))?;
            prop_assert_eq!(id, i as u64 + 1);
        }
        prop_assert_eq!(core.pending_count(), texts.len());
    }

    /// Property: The encoded frame always carries its own id and the text
    #[test]
    fn prop_frame_carries_id_and_text(text in ".{0,64}") {
        let core = established();
        let (id, frame) = core.prepare_message(OutboundMessage::new("C1", text.clone()))?;
        let value: serde_json::Value = serde_json::from_str(&frame)?;
        prop_assert_eq!(&value["id"], &json!(id));
        prop_assert_eq!(&value["text"], &json!(text));
        prop_assert_eq!(&value["type"], &json!("message"));
    }

    /// Property: Each reply removes exactly its own pending entry, once
    #[test]
    fn prop_replies_resolve_exactly_once(
        count in 1usize..20,
        order in prop::collection::vec(any::<prop::sample::Index>(), 1..40),
    ) {
        let core = established();
        for i in 0..count {
            core.prepare_message(OutboundMessage::new("C1", i.to_string()))?;
        }

        let mut resolved = HashSet::new();
        for index in order {
            let id = index.index(count) as u64 + 1;
            let actions = core.handle_text(&json!({ "ok": true, "reply_to": id }).to_string())?;

            let fresh = resolved.insert(id);
            prop_assert_eq!(actions.len(), usize::from(fresh));
            if let Some(SessionAction::Broadcast(Signal::Event(Notification::Sent(sent)))) = actions.first() {
                prop_assert_eq!(sent.id, id);
            }
            prop_assert_eq!(core.pending_count(), count - resolved.len());
        }
    }

    /// Property: Any non-hello first frame closes the session with one error
    #[test]
    fn prop_non_hello_first_frame_closes(tag in "[a-z_]{1,20}") {
        prop_assume!(tag != "hello");
        let core = SessionCore::new(Directory::default());

        let actions = core.handle_text(&json!({ "type": tag }).to_string())?;

        let errors = actions
            .iter()
            .filter(|a| matches!(a, SessionAction::Broadcast(Signal::Error(e)) if e.is_fatal()))
            .count();
        prop_assert_eq!(errors, 1);
        prop_assert!(
            matches!(actions.last(), Some(SessionAction::Close { .. })),
            "last action must be Close"
        );
        prop_assert_eq!(core.state(), SessionState::Closed);
    }

    /// Property: After establishment no push frame changes the state
    #[test]
    fn prop_established_is_stable(tags in prop::collection::vec("[a-z_]{1,20}", 1..20)) {
        let core = established();
        for tag in tags {
            let actions = core.handle_text(&json!({ "type": tag, "error": { "code": 1, "msg": "m" } }).to_string())?;
            for action in actions {
                let is_close = matches!(action, SessionAction::Close { .. });
                prop_assert!(!is_close);
                if let SessionAction::Broadcast(Signal::Error(error)) = action {
                    prop_assert!(matches!(error, SessionError::Remote(_)));
                }
            }
            prop_assert_eq!(core.state(), SessionState::Established);
        }
    }

    /// Property: Name lookups ignore case, id lookups do not
    #[test]
    fn prop_directory_name_case_folding(name in "[a-z][a-z0-9]{0,15}", mask in any::<u64>()) {
        let directory = Directory::from_records(ObjectId::new("U1"), [user("U1", &name)], []);
        let query = recase(&name, mask);

        prop_assert_eq!(directory.user(&query).map(|u| u.id.as_str()), Some("U1"));
        prop_assert!(directory.user_by_id(&ObjectId::new("u1")).is_none());
    }
}
