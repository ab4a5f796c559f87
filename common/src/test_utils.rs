//! Throwaway editor storage trees for tests.
//!
//! Layout mirrors the editor's: `<tmp>/workspaceStorage/<id>/state.vscdb`
//! plus `<tmp>/globalStorage/state.vscdb`.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    time::SystemTime,
};

use rusqlite::{params, Connection};
use serde_json::Value;
use tempfile::TempDir;

use crate::{
    error::AppError,
    storage::{
        db::{KvTable, STATE_DB_FILE},
        types::workspace::WORKSPACE_DESCRIPTOR_FILE,
        workspaces::WorkspaceService,
    },
    utils::config::AppConfig,
};

pub struct WorkspaceFixture {
    dir: TempDir,
}

impl WorkspaceFixture {
    pub fn new() -> Result<Self, AppError> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("workspaceStorage"))?;
        fs::create_dir_all(dir.path().join("globalStorage"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("workspaceStorage")
    }

    pub fn global_db_path(&self) -> PathBuf {
        self.dir.path().join("globalStorage").join(STATE_DB_FILE)
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            workspace_path: self.root().to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    pub fn service(&self) -> WorkspaceService {
        WorkspaceService::from_config(&self.config())
    }

    /// Creates a workspace store holding `items` in `ItemTable`.
    pub fn add_workspace(&self, id: &str, items: &[(&str, Value)]) -> Result<PathBuf, AppError> {
        let path = self.workspace_db_path(id);
        fs::create_dir_all(self.root().join(id))?;
        let conn = create_store(&path)?;
        for (key, value) in items {
            insert(&conn, KvTable::Item, key, &value.to_string())?;
        }
        Ok(path)
    }

    pub fn add_workspace_item(&self, id: &str, key: &str, value: &Value) -> Result<(), AppError> {
        self.add_workspace_raw(id, key, &value.to_string())
    }

    /// Stores `raw` verbatim, for values that are not valid JSON.
    pub fn add_workspace_raw(&self, id: &str, key: &str, raw: &str) -> Result<(), AppError> {
        fs::create_dir_all(self.root().join(id))?;
        let conn = create_store(&self.workspace_db_path(id))?;
        insert(&conn, KvTable::Item, key, raw)
    }

    /// A workspace whose `state.vscdb` is not an SQLite file.
    pub fn add_corrupt_workspace(&self, id: &str) -> Result<(), AppError> {
        fs::create_dir_all(self.root().join(id))?;
        fs::write(self.workspace_db_path(id), b"definitely not sqlite, just junk bytes")?;
        Ok(())
    }

    /// A workspace directory without a store.
    pub fn add_directory(&self, id: &str) -> Result<(), AppError> {
        fs::create_dir_all(self.root().join(id))?;
        Ok(())
    }

    pub fn set_folder(&self, id: &str, folder: &str) -> Result<(), AppError> {
        let descriptor = serde_json::json!({ "folder": folder });
        fs::write(
            self.root().join(id).join(WORKSPACE_DESCRIPTOR_FILE),
            descriptor.to_string(),
        )?;
        Ok(())
    }

    /// Sets the modification time of a workspace store.
    pub fn touch(&self, id: &str, modified: SystemTime) -> Result<(), AppError> {
        let file = File::options()
            .write(true)
            .open(self.workspace_db_path(id))?;
        file.set_modified(modified)?;
        Ok(())
    }

    /// Writes composer bodies into the global store's `cursorDiskKV`.
    pub fn add_global_items<K: AsRef<str>>(&self, items: &[(K, Value)]) -> Result<(), AppError> {
        let conn = create_store(&self.global_db_path())?;
        for (key, value) in items {
            insert(&conn, KvTable::Disk, key.as_ref(), &value.to_string())?;
        }
        Ok(())
    }

    fn workspace_db_path(&self, id: &str) -> PathBuf {
        self.root().join(id).join(STATE_DB_FILE)
    }
}

fn create_store(path: &Path) -> Result<Connection, AppError> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);
         CREATE TABLE IF NOT EXISTS cursorDiskKV (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);",
    )?;
    Ok(conn)
}

fn insert(conn: &Connection, table: KvTable, key: &str, value: &str) -> Result<(), AppError> {
    conn.execute(
        &format!("INSERT INTO {} (key, value) VALUES (?1, ?2)", table.table_name()),
        params![key, value],
    )?;
    Ok(())
}
