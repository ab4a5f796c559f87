use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used when a message carries neither a title nor any content.
pub const UNTITLED_CHAT: &str = "Untitled Chat";

/// Maximum number of characters kept from the first content line in a title.
pub const TITLE_MAX_CHARS: usize = 50;

const TITLE_ELLIPSIS: &str = "...";

/// A single message as stored by the editor.
///
/// There is no fixed schema: fields may be missing, live under `context`, or
/// carry unexpected types. Accessors return `None` instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMessage(Value);

impl RawMessage {
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn context_field(&self, key: &str) -> Option<&Value> {
        self.0.get("context")?.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context_field(key).and_then(Value::as_str)
    }

    /// Numeric code stored under `key`, at the top level or inside `context`.
    /// `2` and `2.0` are the same code.
    pub fn has_code(&self, key: &str, code: i32) -> bool {
        let matches =
            |value: Option<&Value>| value.and_then(Value::as_f64) == Some(f64::from(code));
        matches(self.field(key)) || matches(self.context_field(key))
    }

    /// Millisecond timestamp, stored either as epoch millis or as an RFC 3339
    /// string.
    pub fn timestamp(&self) -> Option<i64> {
        match self.field("timestamp")? {
            Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|at| at.timestamp_millis()),
            value => value.as_i64().or_else(|| {
                value
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| millis as i64)
            }),
        }
    }

    /// Whether `context.<key>` is a non-empty array.
    pub fn has_context_selection(&self, key: &str) -> bool {
        self.context_field(key)
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty())
    }
}

impl From<Value> for RawMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Returns the first non-blank text found on the message, trimmed.
///
/// Candidates are checked in a fixed order: `context.content`,
/// `context.message`, `message`, `content`, `text`. Missing content is not an
/// error and yields an empty string.
pub fn extract_content(msg: &RawMessage) -> String {
    let candidates = [
        msg.context_field("content"),
        msg.context_field("message"),
        msg.field("message"),
        msg.field("content"),
        msg.field("text"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Display title for a conversation, derived from its first message.
pub fn derive_title(msg: &RawMessage) -> String {
    if let Some(title) = msg
        .context_str("title")
        .map(str::trim)
        .filter(|title| !title.is_empty())
    {
        return title.to_owned();
    }

    let content = extract_content(msg);
    if content.is_empty() {
        return UNTITLED_CHAT.to_owned();
    }

    let first_line = content.split('\n').next().unwrap_or_default();
    let mut title: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
    if content.chars().count() > TITLE_MAX_CHARS {
        title.push_str(TITLE_ELLIPSIS);
    }
    title
}
