//! Message attachments.
//!
//! An attachment is a block of secondary content shown under a message:
//! colored sidebar, optional author line, title, body text, image and a
//! table of short fields. Link fields only render together with their owner,
//! so the encoder drops `author_link`/`author_icon` without `author_name`
//! and `title_link` without `title`.

use serde_json::{Map, Value};

use crate::{DecodeError, json};

/// One row of the attachment field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentField {
    /// Field heading
    pub title: String,
    /// Field body
    pub value: String,
    /// Short fields may be laid out side by side
    pub short: bool,
}

impl AttachmentField {
    /// Create a field.
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self { title: title.into(), value: value.into(), short }
    }

    fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("title".into(), Value::from(self.title.as_str()));
        root.insert("value".into(), Value::from(self.value.as_str()));
        root.insert("short".into(), Value::from(self.short));
        Value::Object(root)
    }

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "attachment field";
        let object = json::object(value, ENTITY)?;
        Ok(Self {
            title: json::required_str(object, ENTITY, "title")?.to_string(),
            value: json::required_str(object, ENTITY, "value")?.to_string(),
            short: json::bool_or(object, ENTITY, "short", false)?,
        })
    }
}

/// Rich content attached to a message.
///
/// Built with chained setters:
///
/// ```
/// use huddle_proto::{Attachment, AttachmentField};
///
/// let attachment = Attachment::new("Build failed")
///     .color("danger")
///     .title("CI #42")
///     .field(AttachmentField::new("Branch", "main", true))
///     .markdown_in_text(true);
/// assert_eq!(attachment.fields.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    /// Plain-text summary for clients that cannot render attachments
    pub fallback: String,
    /// Sidebar color: `good`, `warning`, `danger` or a hex code
    pub color: Option<String>,
    /// Text shown above the attachment block
    pub pretext: Option<String>,
    /// Title line
    pub title: Option<String>,
    /// Link target of the title
    pub title_link: Option<String>,
    /// Author line
    pub author_name: Option<String>,
    /// Link target of the author line
    pub author_link: Option<String>,
    /// Icon shown next to the author line
    pub author_icon: Option<String>,
    /// Body text
    pub text: Option<String>,
    /// Image shown inside the block
    pub image_url: Option<String>,
    /// Field table
    pub fields: Vec<AttachmentField>,
    /// Render markdown in `pretext`
    pub format_pretext: bool,
    /// Render markdown in `text`
    pub format_text: bool,
    /// Render markdown in field values
    pub format_fields: bool,
}

impl Attachment {
    /// Create an attachment with its mandatory fallback text.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self { fallback: fallback.into(), ..Self::default() }
    }

    /// Set the sidebar color.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the pretext.
    #[must_use]
    pub fn pretext(mut self, pretext: impl Into<String>) -> Self {
        self.pretext = Some(pretext.into());
        self
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the title link.
    #[must_use]
    pub fn title_link(mut self, link: impl Into<String>) -> Self {
        self.title_link = Some(link.into());
        self
    }

    /// Set the author line.
    #[must_use]
    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }

    /// Set the author link.
    #[must_use]
    pub fn author_link(mut self, link: impl Into<String>) -> Self {
        self.author_link = Some(link.into());
        self
    }

    /// Set the author icon.
    #[must_use]
    pub fn author_icon(mut self, icon: impl Into<String>) -> Self {
        self.author_icon = Some(icon.into());
        self
    }

    /// Set the body text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the image.
    #[must_use]
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }

    /// Toggle markdown in the pretext.
    #[must_use]
    pub fn markdown_in_pretext(mut self, enabled: bool) -> Self {
        self.format_pretext = enabled;
        self
    }

    /// Toggle markdown in the body text.
    #[must_use]
    pub fn markdown_in_text(mut self, enabled: bool) -> Self {
        self.format_text = enabled;
        self
    }

    /// Toggle markdown in field values.
    #[must_use]
    pub fn markdown_in_fields(mut self, enabled: bool) -> Self {
        self.format_fields = enabled;
        self
    }

    /// Encode to the wire shape.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("fallback".into(), Value::from(self.fallback.as_str()));

        let mut put = |key: &str, value: Option<&str>| {
            if let Some(value) = value {
                root.insert(key.to_string(), Value::from(value));
            }
        };

        put("color", self.color.as_deref());
        put("pretext", self.pretext.as_deref());
        put("text", self.text.as_deref());

        if self.author_name.is_some() {
            put("author_name", self.author_name.as_deref());
            put("author_link", self.author_link.as_deref());
            put("author_icon", self.author_icon.as_deref());
        }

        if self.title.is_some() {
            put("title", self.title.as_deref());
            put("title_link", self.title_link.as_deref());
        }

        put("image_url", self.image_url.as_deref());

        if !self.fields.is_empty() {
            let fields = self.fields.iter().map(AttachmentField::to_json).collect();
            root.insert("fields".into(), Value::Array(fields));
        }

        let formats: Vec<Value> = [
            (self.format_pretext, "pretext"),
            (self.format_text, "text"),
            (self.format_fields, "fields"),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, name)| Value::from(name))
        .collect();

        if !formats.is_empty() {
            root.insert("mrkdwn_in".into(), Value::Array(formats));
        }

        Value::Object(root)
    }

    /// Decode from the wire shape. `fallback` is required.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        const ENTITY: &str = "attachment";
        let object = json::object(value, ENTITY)?;
        let text = |field: &'static str| -> Result<Option<String>, DecodeError> {
            Ok(json::optional_str(object, ENTITY, field)?.map(str::to_string))
        };

        let fields = match json::optional_array(object, ENTITY, "fields")? {
            Some(raw) => raw.iter().map(AttachmentField::decode).collect::<Result<_, _>>()?,
            None => Vec::new(),
        };

        let mut attachment = Self {
            fallback: json::required_str(object, ENTITY, "fallback")?.to_string(),
            color: text("color")?,
            pretext: text("pretext")?,
            title: text("title")?,
            title_link: text("title_link")?,
            author_name: text("author_name")?,
            author_link: text("author_link")?,
            author_icon: text("author_icon")?,
            text: text("text")?,
            image_url: text("image_url")?,
            fields,
            ..Self::default()
        };

        if let Some(formats) = json::optional_array(object, ENTITY, "mrkdwn_in")? {
            for format in formats.iter().filter_map(Value::as_str) {
                match format {
                    "pretext" => attachment.format_pretext = true,
                    "text" => attachment.format_text = true,
                    "fields" => attachment.format_fields = true,
                    _ => {},
                }
            }
        }

        Ok(attachment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn minimal_attachment_only_has_fallback() {
        let encoded = Attachment::new("summary").to_json();
        assert_eq!(encoded, json!({ "fallback": "summary" }));
    }

    #[test]
    fn links_require_their_owner() {
        let encoded = Attachment::new("x")
            .author_link("https://example.invalid/a")
            .author_icon("https://example.invalid/a.png")
            .title_link("https://example.invalid/t")
            .to_json();

        assert_eq!(encoded, json!({ "fallback": "x" }));
    }

    #[test]
    fn links_emitted_with_owner() {
        let encoded = Attachment::new("x")
            .author("ci")
            .author_link("https://example.invalid/a")
            .title("Build")
            .title_link("https://example.invalid/t")
            .to_json();

        assert_eq!(
            encoded,
            json!({
                "fallback": "x",
                "author_name": "ci",
                "author_link": "https://example.invalid/a",
                "title": "Build",
                "title_link": "https://example.invalid/t"
            })
        );
    }

    #[test]
    fn mrkdwn_in_lists_only_enabled_formats() {
        let encoded = Attachment::new("x").markdown_in_fields(true).markdown_in_pretext(true).to_json();
        assert_eq!(encoded["mrkdwn_in"], json!(["pretext", "fields"]));

        let plain = Attachment::new("x").to_json();
        assert!(plain.get("mrkdwn_in").is_none());
    }

    #[test]
    fn fields_encoded_in_order() {
        let encoded = Attachment::new("x")
            .field(AttachmentField::new("Branch", "main", true))
            .field(AttachmentField::new("Commit", "abc123", false))
            .to_json();

        assert_eq!(
            encoded["fields"],
            json!([
                { "title": "Branch", "value": "main", "short": true },
                { "title": "Commit", "value": "abc123", "short": false }
            ])
        );
    }

    #[test]
    fn decode_reads_author_icon_from_its_own_field() {
        let attachment = Attachment::decode(&json!({
            "fallback": "x",
            "author_name": "ci",
            "author_link": "https://example.invalid/a",
            "author_icon": "https://example.invalid/a.png",
            "fields": [{ "title": "t", "value": "v" }],
            "mrkdwn_in": ["text", "bogus"]
        }))
        .unwrap();

        assert_eq!(attachment.author_icon.as_deref(), Some("https://example.invalid/a.png"));
        assert_eq!(attachment.fields, vec![AttachmentField::new("t", "v", false)]);
        assert!(attachment.format_text);
        assert!(!attachment.format_pretext);
    }

    #[test]
    fn decode_requires_fallback() {
        let result = Attachment::decode(&json!({ "text": "no fallback" }));
        assert_eq!(
            result,
            Err(DecodeError::MissingField { entity: "attachment", field: "fallback" })
        );
    }
}
