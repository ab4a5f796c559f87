use conversation_classifier::Category;
use serde::{Deserialize, Serialize};

/// One conversation in the cross-workspace log listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceLog {
    pub id: String,
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_folder: Option<String>,
    pub title: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: Category,
    pub message_count: usize,
}
