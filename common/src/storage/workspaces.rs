use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use conversation_classifier::{classify_with, has_file_selections, Category, TracingSink};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    storage::{
        db::{composer_body_key, KvStore, KvTable, CHAT_DATA_KEY, COMPOSER_DATA_KEY, STATE_DB_FILE},
        types::{
            chat_tab::{ChatPanelData, ChatTab},
            composer::{ComposerEntry, ComposerIndex, ConversationRecord, WorkspaceComposers},
            short_id,
            workspace::{WorkspaceDescriptor, WorkspaceSummary, WORKSPACE_DESCRIPTOR_FILE},
            workspace_log::WorkspaceLog,
        },
    },
    utils::config::AppConfig,
};

/// Chat tabs and remaining composers of one workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceTabs {
    pub tabs: Vec<ChatTab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composers: Option<WorkspaceComposers>,
}

impl WorkspaceTabs {
    pub fn composer_count(&self) -> usize {
        self.composers
            .as_ref()
            .map_or(0, |composers| composers.all_composers.len())
    }
}

/// A workspace directory that has a store.
struct WorkspaceDir {
    id: String,
    dir: PathBuf,
    db_path: PathBuf,
}

/// Reads conversations out of the editor's workspace storage.
///
/// Every call opens the stores it needs and closes them before returning.
/// All filesystem and SQLite work happens on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct WorkspaceService {
    root: PathBuf,
    global_db: PathBuf,
}

impl WorkspaceService {
    pub fn new(root: impl Into<PathBuf>, global_db: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_db: global_db.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.workspace_root(), config.global_db_path())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Every workspace with a store, newest first.
    pub async fn list_workspaces(&self) -> Result<Vec<WorkspaceSummary>, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.list_workspaces_blocking()).await?
    }

    /// Chat tabs and composers of one workspace.
    pub async fn workspace_tabs(&self, workspace_id: &str) -> Result<WorkspaceTabs, AppError> {
        let service = self.clone();
        let workspace_id = workspace_id.to_string();
        tokio::task::spawn_blocking(move || service.workspace_tabs_blocking(&workspace_id)).await?
    }

    /// Number of composers a workspace shows after chat conversations are
    /// split off. Failures count as zero.
    pub async fn composer_count(&self, workspace_id: &str) -> usize {
        match self.workspace_tabs(workspace_id).await {
            Ok(tabs) => tabs.composer_count(),
            Err(AppError::NotFound(_)) => 0,
            Err(err) => {
                warn!(workspace_id, error = %err, "Failed to count composers");
                0
            }
        }
    }

    /// Conversations across all workspaces, newest first.
    pub async fn collect_logs(&self) -> Result<Vec<WorkspaceLog>, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.collect_logs_blocking()).await?
    }

    fn list_workspaces_blocking(&self) -> Result<Vec<WorkspaceSummary>, AppError> {
        if !self.root_exists() {
            return Err(AppError::NotFound(format!(
                "Workspace path does not exist: {}",
                self.root.display()
            )));
        }

        let mut workspaces = Vec::new();
        for workspace in self.workspace_dirs()? {
            match summarize(&workspace) {
                Ok(summary) => workspaces.push(summary),
                Err(err) => {
                    warn!(workspace_id = %workspace.id, error = %err, "Skipping unreadable workspace");
                }
            }
        }

        workspaces.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        debug!(count = workspaces.len(), "Listed workspaces");
        Ok(workspaces)
    }

    fn workspace_tabs_blocking(&self, workspace_id: &str) -> Result<WorkspaceTabs, AppError> {
        validate_workspace_id(workspace_id)?;

        let db_path = self.root.join(workspace_id).join(STATE_DB_FILE);
        if !db_path.is_file() {
            return Err(AppError::NotFound("Workspace not found".to_string()));
        }

        let (chat_raw, composer_raw) = {
            let store = KvStore::open_read_only(&db_path)?;
            (
                store.get_value(KvTable::Item, CHAT_DATA_KEY)?,
                store.get_value(KvTable::Item, COMPOSER_DATA_KEY)?,
            )
        };

        let mut tabs: Vec<ChatTab> = chat_raw
            .and_then(|raw| parse_json::<ChatPanelData>(&raw, CHAT_DATA_KEY, workspace_id))
            .map(|data| {
                data.tabs
                    .into_iter()
                    .filter_map(ChatTab::from_panel_tab)
                    .collect()
            })
            .unwrap_or_default();

        let composers = match composer_raw
            .and_then(|raw| parse_json::<ComposerIndex>(&raw, COMPOSER_DATA_KEY, workspace_id))
        {
            Some(index) => Some(self.split_composers(workspace_id, index, &mut tabs)?),
            None => None,
        };

        let result = WorkspaceTabs { tabs, composers };
        if result.tabs.is_empty() && result.composer_count() == 0 {
            return Err(AppError::NotFound("No chat data found".to_string()));
        }

        Ok(result)
    }

    /// Moves composer conversations that classify as chat into `tabs` and
    /// returns the rest. Without a global store the index is returned as is.
    fn split_composers(
        &self,
        workspace_id: &str,
        index: ComposerIndex,
        tabs: &mut Vec<ChatTab>,
    ) -> Result<WorkspaceComposers, AppError> {
        let keys = composer_keys(&index);
        if keys.is_empty() || !self.global_db.is_file() {
            return Ok(WorkspaceComposers::from(index));
        }

        let mut bodies = self.fetch_bodies(&keys)?;
        let sink = TracingSink;
        let mut remaining = Vec::new();

        for key in &keys {
            let Some(raw) = bodies.remove(key) else {
                continue;
            };
            let Some(mut record) = parse_json::<ConversationRecord>(&raw, key, workspace_id) else {
                continue;
            };
            let composer_id = record
                .composer_id
                .get_or_insert_with(|| key_to_composer_id(key).to_string())
                .clone();

            if !record.conversation.is_empty()
                && classify_with(&record.conversation, &sink) == Category::Chat
            {
                if let Some(tab) = ChatTab::from_conversation(&composer_id, &record.conversation) {
                    tabs.push(tab);
                }
            } else {
                remaining.push(ComposerEntry::Full(record));
            }
        }

        debug!(
            workspace_id,
            composers = remaining.len(),
            tabs = tabs.len(),
            "Split composer conversations"
        );

        Ok(WorkspaceComposers {
            all_composers: remaining,
            extra: index.extra,
        })
    }

    fn collect_logs_blocking(&self) -> Result<Vec<WorkspaceLog>, AppError> {
        let mut logs = Vec::new();

        for workspace in self.workspace_dirs()? {
            match self.workspace_logs(&workspace) {
                Ok(workspace_logs) => logs.extend(workspace_logs),
                Err(err) => {
                    warn!(workspace_id = %workspace.id, error = %err, "Skipping logs of unreadable workspace");
                }
            }
        }

        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        debug!(count = logs.len(), "Collected conversation logs");
        Ok(logs)
    }

    /// Chat tabs and composers of one workspace as log entries.
    fn workspace_logs(&self, workspace: &WorkspaceDir) -> Result<Vec<WorkspaceLog>, AppError> {
        let mut logs = Vec::new();
        let folder = read_descriptor(workspace);
        let (chat_raw, composer_raw) = {
            let store = KvStore::open_read_only(&workspace.db_path)?;
            (
                store.get_value(KvTable::Item, CHAT_DATA_KEY)?,
                store.get_value(KvTable::Item, COMPOSER_DATA_KEY)?,
            )
        };

        if let Some(data) =
            chat_raw.and_then(|raw| parse_json::<ChatPanelData>(&raw, CHAT_DATA_KEY, &workspace.id))
        {
            logs.extend(data.tabs.iter().map(|tab| WorkspaceLog {
                id: tab.id().to_string(),
                workspace_id: workspace.id.clone(),
                workspace_folder: folder.clone(),
                title: tab.display_title(),
                timestamp: tab.timestamp_millis().unwrap_or_else(now_millis),
                kind: Category::Chat,
                message_count: tab.bubbles.len(),
            }));
        }

        let Some(index) = composer_raw
            .and_then(|raw| parse_json::<ComposerIndex>(&raw, COMPOSER_DATA_KEY, &workspace.id))
        else {
            return Ok(logs);
        };

        let keys = composer_keys(&index);
        if keys.is_empty() || !self.global_db.is_file() {
            return Ok(logs);
        }
        let mut bodies = self.fetch_bodies(&keys)?;

        for head in &index.all_composers {
            let key = composer_body_key(&head.composer_id);
            let Some(raw) = bodies.remove(&key) else {
                continue;
            };
            let Some(record) = parse_json::<ConversationRecord>(&raw, &key, &workspace.id) else {
                continue;
            };

            let is_editor_chat = record.first_message().is_some_and(has_file_selections);
            let kind = if is_editor_chat {
                Category::Composer
            } else {
                Category::Chat
            };
            let title = head.text().map_or_else(
                || {
                    let label = if is_editor_chat { "Composer" } else { "Chat" };
                    format!("{label} {}", short_id(&head.composer_id))
                },
                str::to_owned,
            );

            logs.push(WorkspaceLog {
                id: head.composer_id.clone(),
                workspace_id: workspace.id.clone(),
                workspace_folder: folder.clone(),
                title,
                timestamp: head.updated_millis().unwrap_or_else(now_millis),
                kind,
                message_count: record.conversation.len(),
            });
        }

        Ok(logs)
    }

    fn fetch_bodies(&self, keys: &[String]) -> Result<HashMap<String, String>, AppError> {
        let store = KvStore::open_read_only(&self.global_db)?;
        Ok(store
            .get_values(KvTable::Disk, keys)?
            .into_iter()
            .collect())
    }

    fn workspace_dirs(&self) -> Result<Vec<WorkspaceDir>, AppError> {
        let mut workspaces = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let id = entry.file_name().to_string_lossy().into_owned();
            let dir = entry.path();
            let db_path = dir.join(STATE_DB_FILE);
            if !db_path.is_file() {
                debug!(workspace_id = %id, "Skipping workspace without {}", STATE_DB_FILE);
                continue;
            }

            workspaces.push(WorkspaceDir { id, dir, db_path });
        }

        Ok(workspaces)
    }
}

fn summarize(workspace: &WorkspaceDir) -> Result<WorkspaceSummary, AppError> {
    let modified = fs::metadata(&workspace.db_path)?.modified()?;

    let composer_count = {
        let store = KvStore::open_read_only(&workspace.db_path)?;
        store
            .get_value(KvTable::Item, COMPOSER_DATA_KEY)?
            .and_then(|raw| parse_json::<ComposerIndex>(&raw, COMPOSER_DATA_KEY, &workspace.id))
            .map_or(0, |index| index.all_composers.len())
    };

    Ok(WorkspaceSummary {
        id: workspace.id.clone(),
        path: workspace.db_path.to_string_lossy().into_owned(),
        folder: read_descriptor(workspace),
        last_modified: DateTime::<Utc>::from(modified),
        composer_count,
    })
}

fn read_descriptor(workspace: &WorkspaceDir) -> Option<String> {
    let path = workspace.dir.join(WORKSPACE_DESCRIPTOR_FILE);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(workspace_id = %workspace.id, error = %err, "No workspace descriptor");
            return None;
        }
    };

    parse_json::<WorkspaceDescriptor>(&raw, WORKSPACE_DESCRIPTOR_FILE, &workspace.id)
        .and_then(|descriptor| descriptor.folder)
}

/// Parses a stored JSON value. Malformed values are logged and treated as absent.
fn parse_json<T: DeserializeOwned>(raw: &str, what: &str, workspace_id: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(workspace_id, key = what, error = %err, "Ignoring malformed JSON");
            None
        }
    }
}

fn composer_keys(index: &ComposerIndex) -> Vec<String> {
    index
        .all_composers
        .iter()
        .filter(|head| !head.composer_id.is_empty())
        .map(|head| composer_body_key(&head.composer_id))
        .collect()
}

fn key_to_composer_id(key: &str) -> &str {
    key.strip_prefix("composerData:").unwrap_or(key)
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Workspace ids are single directory names.
pub fn validate_workspace_id(workspace_id: &str) -> Result<(), AppError> {
    let invalid = workspace_id.is_empty()
        || workspace_id == "."
        || workspace_id == ".."
        || workspace_id.contains(['/', '\\'])
        || workspace_id.contains('\0');

    if invalid {
        return Err(AppError::Validation(format!(
            "Invalid workspace id: {workspace_id:?}"
        )));
    }
    Ok(())
}
