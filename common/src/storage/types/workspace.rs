use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the descriptor file some workspace directories carry.
pub const WORKSPACE_DESCRIPTOR_FILE: &str = "workspace.json";

/// Contents of `workspace.json`. Only the opened folder is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceDescriptor {
    #[serde(default)]
    pub folder: Option<String>,
}

/// One row of the workspace listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub id: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub composer_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_keys() {
        let summary = WorkspaceSummary {
            id: "abc".into(),
            path: "/ws/abc/state.vscdb".into(),
            folder: Some("file:///home/me/proj".into()),
            last_modified: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
            composer_count: 3,
        };

        assert_eq!(
            serde_json::to_value(&summary).expect("serialize"),
            json!({
                "id": "abc",
                "path": "/ws/abc/state.vscdb",
                "folder": "file:///home/me/proj",
                "lastModified": "2024-05-06T07:08:09Z",
                "composerCount": 3
            })
        );
    }

    #[test]
    fn descriptor_tolerates_missing_folder() {
        let descriptor: WorkspaceDescriptor =
            serde_json::from_str(r#"{"configuration": "x.code-workspace"}"#).expect("parse");
        assert!(descriptor.folder.is_none());
    }
}
