use std::path::Path;

use rusqlite::{params_from_iter, types::ValueRef, Connection, OpenFlags, OptionalExtension};

use crate::error::AppError;

/// File name of every editor key-value store, per workspace and global.
pub const STATE_DB_FILE: &str = "state.vscdb";

/// Per-workspace key holding the legacy chat panel tabs.
pub const CHAT_DATA_KEY: &str = "workbench.panel.aichat.view.aichat.chatdata";

/// Per-workspace key holding the composer index.
pub const COMPOSER_DATA_KEY: &str = "composer.composerData";

/// Global key under which a composer's full body is stored.
pub fn composer_body_key(composer_id: &str) -> String {
    format!("composerData:{composer_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvTable {
    /// `ItemTable`, present in every store.
    Item,
    /// `cursorDiskKV`, present in the global store.
    Disk,
}

impl KvTable {
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Item => "ItemTable",
            Self::Disk => "cursorDiskKV",
        }
    }
}

/// Read-only handle on one `state.vscdb` file. The connection is closed when
/// the handle is dropped.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    pub fn open_read_only(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self { conn })
    }

    /// Fetches a single value. Absent keys and NULL values both yield `None`.
    pub fn get_value(&self, table: KvTable, key: &str) -> Result<Option<String>, AppError> {
        let sql = format!(
            "SELECT value FROM {} WHERE [key] = ?1",
            table.table_name()
        );

        let value = self
            .conn
            .query_row(&sql, [key], |row| Ok(decode_value(row.get_ref(0)?)))
            .optional()?;

        Ok(value.flatten())
    }

    /// Fetches all present `(key, value)` pairs for `keys` in one query.
    pub fn get_values(
        &self,
        table: KvTable,
        keys: &[String],
    ) -> Result<Vec<(String, String)>, AppError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; keys.len()].join(",");
        let sql = format!(
            "SELECT [key], value FROM {} WHERE [key] IN ({placeholders})",
            table.table_name()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(keys.iter()), |row| {
                Ok((row.get::<_, String>(0)?, decode_value(row.get_ref(1)?)))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect())
    }
}

// Values are written as TEXT by some editor versions and as BLOB by others.
fn decode_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(number) => Some(number.to_string()),
        ValueRef::Real(number) => Some(number.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use tempfile::TempDir;

    fn seeded_store() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(STATE_DB_FILE);
        let conn = Connection::open(&path).expect("open writable store");
        conn.execute_batch(
            "CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);
             CREATE TABLE cursorDiskKV (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);",
        )
        .expect("create tables");
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
            params![COMPOSER_DATA_KEY, r#"{"allComposers":[]}"#],
        )
        .expect("insert text value");
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            params![composer_body_key("a"), br#"{"composerId":"a"}"#.to_vec()],
        )
        .expect("insert blob value");
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            params![composer_body_key("b"), r#"{"composerId":"b"}"#],
        )
        .expect("insert text value");
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, NULL)",
            params![composer_body_key("null")],
        )
        .expect("insert null value");
        (dir, path)
    }

    #[test]
    fn reads_text_values() {
        let (_dir, path) = seeded_store();
        let store = KvStore::open_read_only(&path).expect("open store");

        let value = store
            .get_value(KvTable::Item, COMPOSER_DATA_KEY)
            .expect("query");
        assert_eq!(value.as_deref(), Some(r#"{"allComposers":[]}"#));

        let missing = store.get_value(KvTable::Item, CHAT_DATA_KEY).expect("query");
        assert!(missing.is_none());
    }

    #[test]
    fn reads_blob_values_and_batches_lookups() {
        let (_dir, path) = seeded_store();
        let store = KvStore::open_read_only(&path).expect("open store");

        let keys = vec![
            composer_body_key("a"),
            composer_body_key("b"),
            composer_body_key("missing"),
            composer_body_key("null"),
        ];
        let mut rows = store.get_values(KvTable::Disk, &keys).expect("query");
        rows.sort();

        assert_eq!(
            rows,
            vec![
                (composer_body_key("a"), r#"{"composerId":"a"}"#.to_string()),
                (composer_body_key("b"), r#"{"composerId":"b"}"#.to_string()),
            ]
        );
    }

    #[test]
    fn empty_key_list_skips_the_query() {
        let (_dir, path) = seeded_store();
        let store = KvStore::open_read_only(&path).expect("open store");
        assert!(store.get_values(KvTable::Disk, &[]).expect("query").is_empty());
    }

    #[test]
    fn store_is_read_only() {
        let (_dir, path) = seeded_store();
        let store = KvStore::open_read_only(&path).expect("open store");
        let result = store
            .conn
            .execute("DELETE FROM ItemTable", []);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let result = KvStore::open_read_only(&dir.path().join("absent.vscdb"));
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
