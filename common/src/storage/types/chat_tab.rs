use conversation_classifier::{derive_title, normalize, NormalizedMessage, RawMessage, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{millis_from_value, null_as_default, rfc3339_or_now, short_id};

/// The per-workspace chat panel value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatPanelData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tabs: Vec<RawChatTab>,
}

/// A chat panel tab as the editor stores it. Older and newer editor versions
/// disagree on field names, so both spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatTab {
    #[serde(default)]
    pub tab_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub chat_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_send_time: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bubbles: Vec<Value>,
}

impl RawChatTab {
    pub fn id(&self) -> &str {
        self.tab_id
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_default()
    }

    /// Stored title, first line only. `None` when blank.
    pub fn title(&self) -> Option<&str> {
        self.chat_title
            .as_deref()
            .or(self.title.as_deref())
            .and_then(|title| title.split('\n').next())
            .filter(|line| !line.is_empty())
    }

    pub fn display_title(&self) -> String {
        self.title()
            .map_or_else(|| format!("Chat {}", short_id(self.id())), str::to_owned)
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        self.last_send_time
            .as_ref()
            .or(self.timestamp.as_ref())
            .and_then(millis_from_value)
    }
}

/// A normalized bubble in the shape chat panel bubbles use, so the two kinds
/// can be rendered the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatBubble {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl From<NormalizedMessage> for ChatBubble {
    fn from(message: NormalizedMessage) -> Self {
        Self {
            kind: message.role.bubble_type(),
            role: message.role,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bubble {
    Normalized(ChatBubble),
    /// Chat panel bubbles are passed through untouched.
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTab {
    pub id: String,
    pub title: String,
    pub timestamp: String,
    pub bubbles: Vec<Bubble>,
}

impl ChatTab {
    /// Builds a tab from a chat panel entry. Tabs without bubbles yield `None`.
    pub fn from_panel_tab(tab: RawChatTab) -> Option<Self> {
        if tab.bubbles.is_empty() {
            return None;
        }

        Some(Self {
            id: tab.id().to_string(),
            title: tab.display_title(),
            timestamp: rfc3339_or_now(tab.timestamp_millis()),
            bubbles: tab.bubbles.into_iter().map(Bubble::Raw).collect(),
        })
    }

    /// Builds a tab from a composer conversation classified as chat.
    /// Empty conversations yield `None`.
    pub fn from_conversation(id: &str, conversation: &[RawMessage]) -> Option<Self> {
        let first = conversation.first()?;

        Some(Self {
            id: id.to_string(),
            title: derive_title(first),
            timestamp: rfc3339_or_now(first.timestamp()),
            bubbles: normalize(conversation)
                .into_iter()
                .map(|message| Bubble::Normalized(message.into()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn panel_tab_uses_stored_fields() {
        let tab: RawChatTab = serde_json::from_value(json!({
            "tabId": "tab-1234567890",
            "chatTitle": "Fix the build\nmore details",
            "lastSendTime": 1_704_164_645_006_i64,
            "bubbles": [{ "type": "user", "text": "hi" }]
        }))
        .expect("parse tab");

        let chat_tab = ChatTab::from_panel_tab(tab).expect("tab has bubbles");
        assert_eq!(chat_tab.id, "tab-1234567890");
        assert_eq!(chat_tab.title, "Fix the build");
        assert_eq!(chat_tab.timestamp, "2024-01-02T03:04:05.006Z");
        assert_eq!(
            chat_tab.bubbles,
            vec![Bubble::Raw(json!({ "type": "user", "text": "hi" }))]
        );
    }

    #[test]
    fn panel_tab_accepts_alternate_field_names() {
        let tab: RawChatTab = serde_json::from_value(json!({
            "id": "abcdefghijk",
            "timestamp": 5,
            "bubbles": null
        }))
        .expect("parse tab");

        assert_eq!(tab.id(), "abcdefghijk");
        assert_eq!(tab.display_title(), "Chat abcdefgh");
        assert_eq!(tab.timestamp_millis(), Some(5));
        assert!(ChatTab::from_panel_tab(tab).is_none());
    }

    #[test]
    fn conversation_tab_normalizes_bubbles() {
        let conversation: Vec<RawMessage> = vec![
            json!({ "type": 1, "text": "How do I parse JSON?", "timestamp": 1_704_164_645_006_i64 }),
            json!({ "type": 2, "text": "Use serde_json." }),
        ]
        .into_iter()
        .map(RawMessage::from)
        .collect();

        let tab = ChatTab::from_conversation("composer-1", &conversation).expect("non-empty");
        assert_eq!(tab.title, "How do I parse JSON?");
        assert_eq!(tab.timestamp, "2024-01-02T03:04:05.006Z");
        assert_eq!(
            serde_json::to_value(&tab.bubbles).expect("serialize"),
            json!([
                { "type": "user", "role": "user", "content": "How do I parse JSON?", "timestamp": 1_704_164_645_006_i64 },
                { "type": "ai", "role": "assistant", "content": "Use serde_json." }
            ])
        );
    }

    #[test]
    fn conversation_tab_keeps_string_timestamps() {
        let conversation = vec![RawMessage::from(json!({
            "type": 1,
            "text": "When did this start failing?",
            "timestamp": "2024-01-02T03:04:05.006Z"
        }))];

        let tab = ChatTab::from_conversation("composer-2", &conversation).expect("non-empty");
        assert_eq!(tab.timestamp, "2024-01-02T03:04:05.006Z");
        assert_eq!(
            serde_json::to_value(&tab.bubbles).expect("serialize")[0]["timestamp"],
            json!(1_704_164_645_006_i64)
        );
    }

    #[test]
    fn empty_conversation_has_no_tab() {
        assert!(ChatTab::from_conversation("c", &[]).is_none());
    }
}
