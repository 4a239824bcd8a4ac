//! Outbound message requests.

use serde::Serialize;
use serde_json::Value;

use crate::{Attachment, MESSAGE_TYPE, ObjectId};

/// Request to post content into a channel.
///
/// Has no identity of its own. The session assigns a correlation id when the
/// message is submitted and writes it into the encoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Target conversation
    pub channel: ObjectId,
    /// Message text
    pub text: String,
    /// Parent message timestamp when replying in a thread
    pub thread_ts: Option<String>,
    /// Post as the authenticated user (default) rather than as a bot
    pub as_user: bool,
    /// Attachments
    pub attachments: Option<Vec<Attachment>>,
    /// Layout blocks, raw JSON
    pub blocks: Option<Vec<Value>>,
}

/// Wire shape. Field order is the emitted key order.
#[derive(Serialize)]
struct OutboundFrame<'a> {
    id: u64,
    #[serde(rename = "type")]
    kind: &'static str,
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    as_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<&'a [Value]>,
}

impl OutboundMessage {
    /// Plain text message into `channel`.
    pub fn new(channel: impl Into<ObjectId>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            thread_ts: None,
            as_user: true,
            attachments: None,
            blocks: None,
        }
    }

    /// Reply in the thread rooted at `thread_ts`.
    #[must_use]
    pub fn in_thread(mut self, thread_ts: impl Into<String>) -> Self {
        self.thread_ts = Some(thread_ts.into());
        self
    }

    /// Append an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    /// Replace the layout blocks.
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<Value>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    /// Choose between posting as the user or as a bot.
    #[must_use]
    pub fn as_user(mut self, as_user: bool) -> Self {
        self.as_user = as_user;
        self
    }

    /// Encode as a `message` frame carrying correlation id `id`.
    pub fn encode(&self, id: u64) -> Result<String, serde_json::Error> {
        let frame = OutboundFrame {
            id,
            kind: MESSAGE_TYPE,
            channel: self.channel.as_str(),
            text: &self.text,
            thread_ts: self.thread_ts.as_deref(),
            as_user: self.as_user,
            attachments: self
                .attachments
                .as_ref()
                .map(|attachments| attachments.iter().map(Attachment::to_json).collect()),
            blocks: self.blocks.as_deref(),
        };
        serde_json::to_string(&frame)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encode_plain_message() {
        let encoded = OutboundMessage::new("X", "hi").encode(1).unwrap();
        insta::assert_snapshot!(encoded, @r#"{"id":1,"type":"message","channel":"X","text":"hi","as_user":true}"#);
    }

    #[test]
    fn encode_thread_reply_as_bot() {
        let encoded =
            OutboundMessage::new("C1", "ack").in_thread("1.000002").as_user(false).encode(7).unwrap();
        insta::assert_snapshot!(encoded, @r#"{"id":7,"type":"message","channel":"C1","text":"ack","thread_ts":"1.000002","as_user":false}"#);
    }

    #[test]
    fn encode_attachments_and_blocks() {
        let message = OutboundMessage::new("C1", "")
            .with_attachment(Attachment::new("fb").color("good"))
            .with_blocks(vec![json!({ "type": "divider" })]);

        let encoded: Value = serde_json::from_str(&message.encode(3).unwrap()).unwrap();
        assert_eq!(encoded["attachments"], json!([{ "fallback": "fb", "color": "good" }]));
        assert_eq!(encoded["blocks"], json!([{ "type": "divider" }]));
    }

    #[test]
    fn empty_attachment_list_is_still_sent() {
        let message = OutboundMessage { attachments: Some(vec![]), ..OutboundMessage::new("C1", "") };
        let encoded: Value = serde_json::from_str(&message.encode(1).unwrap()).unwrap();
        assert_eq!(encoded["attachments"], json!([]));
    }
}
