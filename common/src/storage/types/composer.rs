use conversation_classifier::{derive_title, RawMessage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{millis_from_value, null_as_default, short_id};

/// The per-workspace composer index. Fields besides `allComposers` are kept
/// so the index can be handed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerIndex {
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_composers: Vec<ComposerHead>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Summary entry of one composer inside the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerHead {
    #[serde(default, deserialize_with = "null_as_default")]
    pub composer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComposerHead {
    /// Stored text, when not blank.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }

    pub fn updated_millis(&self) -> Option<i64> {
        self.last_updated_at
            .as_ref()
            .and_then(millis_from_value)
            .or_else(|| self.created_at.as_ref().and_then(millis_from_value))
    }
}

/// A composer's full body from the global store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conversation: Vec<RawMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationRecord {
    pub fn first_message(&self) -> Option<&RawMessage> {
        self.conversation.first()
    }
}

/// An entry of the composer list returned for a workspace: the full body when
/// the global store had one, the index summary otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComposerEntry {
    Full(ConversationRecord),
    Head(ComposerHead),
}

impl ComposerEntry {
    pub fn id(&self) -> &str {
        match self {
            Self::Full(record) => record.composer_id.as_deref().unwrap_or_default(),
            Self::Head(head) => &head.composer_id,
        }
    }

    pub fn title(&self) -> String {
        let stored = match self {
            Self::Full(record) => record.first_message().map(derive_title),
            Self::Head(head) => head.text().map(str::to_owned),
        };
        stored.unwrap_or_else(|| format!("Composer {}", short_id(self.id())))
    }

    pub fn message_count(&self) -> usize {
        match self {
            Self::Full(record) => record.conversation.len(),
            Self::Head(_) => 0,
        }
    }

    pub fn updated_millis(&self) -> Option<i64> {
        match self {
            Self::Full(record) => record
                .last_updated_at
                .as_ref()
                .and_then(millis_from_value)
                .or_else(|| record.created_at.as_ref().and_then(millis_from_value)),
            Self::Head(head) => head.updated_millis(),
        }
    }
}

/// Composer index as returned to clients, with `allComposers` replaced by the
/// entries that were not moved to the chat tabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceComposers {
    pub all_composers: Vec<ComposerEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<ComposerIndex> for WorkspaceComposers {
    fn from(index: ComposerIndex) -> Self {
        Self {
            all_composers: index
                .all_composers
                .into_iter()
                .map(ComposerEntry::Head)
                .collect(),
            extra: index.extra,
        }
    }
}
