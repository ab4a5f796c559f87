use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::storage::db::STATE_DB_FILE;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    /// Directory holding one subdirectory per editor workspace.
    pub workspace_path: String,
    /// Overrides the global store location derived from `workspace_path`.
    #[serde(default)]
    pub global_storage_path: Option<String>,
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_logs_per_page")]
    pub logs_per_page: usize,
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_http_port() -> u16 {
    3000
}

const fn default_logs_per_page() -> usize {
    25
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace_path: String::new(),
            global_storage_path: None,
            http_host: default_http_host(),
            http_port: default_http_port(),
            logs_per_page: default_logs_per_page(),
        }
    }
}

impl AppConfig {
    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(&self.workspace_path)
    }

    /// The shared store, by default `<workspace_path>/../globalStorage/state.vscdb`.
    pub fn global_db_path(&self) -> PathBuf {
        self.global_storage_path.as_ref().map_or_else(
            || {
                self.workspace_root()
                    .join("..")
                    .join("globalStorage")
                    .join(STATE_DB_FILE)
            },
            PathBuf::from,
        )
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn derives_global_store_next_to_workspace_storage() {
        let config = AppConfig {
            workspace_path: "/data/User/workspaceStorage".into(),
            ..Default::default()
        };
        assert_eq!(
            config.global_db_path(),
            Path::new("/data/User/workspaceStorage/../globalStorage/state.vscdb")
        );
    }

    #[test]
    fn explicit_global_store_wins() {
        let config = AppConfig {
            workspace_path: "/data/User/workspaceStorage".into(),
            global_storage_path: Some("/elsewhere/state.vscdb".into()),
            ..Default::default()
        };
        assert_eq!(config.global_db_path(), Path::new("/elsewhere/state.vscdb"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("workspace_path", "/tmp/ws")
            .and_then(|builder| builder.build())
            .and_then(Config::try_deserialize)
            .expect("config should deserialize");

        assert_eq!(config.workspace_path, "/tmp/ws");
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.http_host, "127.0.0.1");
        assert_eq!(config.logs_per_page, 25);
        assert!(config.global_storage_path.is_none());
    }
}
