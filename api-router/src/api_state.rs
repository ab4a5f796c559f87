use common::{storage::workspaces::WorkspaceService, utils::config::AppConfig};

#[derive(Clone)]
pub struct ApiState {
    pub workspaces: WorkspaceService,
}

impl ApiState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            workspaces: WorkspaceService::from_config(config),
        }
    }
}
