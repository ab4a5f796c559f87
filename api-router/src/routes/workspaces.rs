use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use common::{error::AppError, storage::workspaces::WorkspaceTabs};
use serde_json::json;
use tracing::{error, warn};

use crate::{api_state::ApiState, error::ApiError};

/// Lists every workspace with a store. Failures answer with an empty array.
pub async fn list_workspaces(State(state): State<ApiState>) -> impl IntoResponse {
    match state.workspaces.list_workspaces().await {
        Ok(workspaces) => (StatusCode::OK, Json(json!(workspaces))),
        Err(AppError::NotFound(msg)) => {
            warn!("{msg}");
            (StatusCode::NOT_FOUND, Json(json!([])))
        }
        Err(err) => {
            error!("Failed to list workspaces: {err:?}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!([])))
        }
    }
}

pub async fn workspace_tabs(
    State(state): State<ApiState>,
    Path(workspace_id): Path<String>,
) -> Result<Json<WorkspaceTabs>, ApiError> {
    state
        .workspaces
        .workspace_tabs(&workspace_id)
        .await
        .map(Json)
        .map_err(|err| ApiError::with_internal_message(err, "Failed to get workspace data"))
}
