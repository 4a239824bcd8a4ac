//! Property-based tests for inbound frame routing and outbound encoding.

#![allow(clippy::unwrap_used)]

use huddle_proto::{Event, InboundFrame, LifecycleKind, OutboundMessage, PushFrame};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Tags with a dedicated decode path.
fn is_known_tag(tag: &str) -> bool {
    matches!(tag, "hello" | "message" | "error") || LifecycleKind::from_tag(tag).is_some()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: Parsing arbitrary text never panics
    #[test]
    fn prop_parse_never_panics(text in ".{0,200}") {
        let _ = InboundFrame::parse(&text);
    }

    /// Property: Objects carrying reply_to always take the reply path
    #[test]
    fn prop_reply_to_routes_to_reply(reply_to in any::<u64>(), ok in any::<bool>(), tag in "[a-z_]{1,20}") {
        let text = json!({ "type": tag, "ok": ok, "reply_to": reply_to }).to_string();
        let frame = InboundFrame::parse(&text).unwrap();
        prop_assert!(matches!(frame, InboundFrame::Reply(_)));
    }

    /// Property: Unknown tags decode to Unrecognized, never to an error
    #[test]
    fn prop_unknown_tags_are_unrecognized(tag in "[a-z_]{1,24}") {
        prop_assume!(!is_known_tag(&tag));
        let event = Event::decode(&PushFrame::new(json!({ "type": tag.clone(), "x": 1 }))).unwrap();
        prop_assert_eq!(event, Some(Event::Unrecognized(tag)));
    }

    /// Property: Frames without a string tag produce no event
    #[test]
    fn prop_untagged_frames_produce_nothing(n in any::<i64>(), text in "[a-z ]{0,20}") {
        let numeric = Event::decode(&PushFrame::new(json!({ "type": n, "text": text.clone() }))).unwrap();
        prop_assert_eq!(numeric, None);

        let missing = Event::decode(&PushFrame::new(json!({ "text": text }))).unwrap();
        prop_assert_eq!(missing, None);
    }

    /// Property: The encoded frame carries exactly the given id and content
    #[test]
    fn prop_encoded_frame_carries_id(id in 1u64.., channel in "[A-Z0-9]{1,11}", text in ".{0,64}") {
        let encoded = OutboundMessage::new(channel.as_str(), text.clone()).encode(id).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();

        prop_assert_eq!(value["id"].as_u64(), Some(id));
        prop_assert_eq!(value["type"].as_str(), Some("message"));
        prop_assert_eq!(value["channel"].as_str(), Some(channel.as_str()));
        prop_assert_eq!(value["text"].as_str(), Some(text.as_str()));
        prop_assert_eq!(value["as_user"].as_bool(), Some(true));
        prop_assert!(value.get("thread_ts").is_none());
    }
}
